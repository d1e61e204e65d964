use std::fmt;
use thiserror::Error;

/// A single reason why a value, directive or command was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// One option failed its type, bound, format or choice constraint.
    Field { field: String, reason: String },
    /// A rule spanning several fields of one directive failed.
    Composite { directive: String, reason: String },
    /// A command-level check failed.
    Aggregate { reason: String },
}

impl Violation {
    pub fn field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Violation::Field {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn composite(directive: impl Into<String>, reason: impl Into<String>) -> Self {
        Violation::Composite {
            directive: directive.into(),
            reason: reason.into(),
        }
    }

    pub fn aggregate(reason: impl Into<String>) -> Self {
        Violation::Aggregate {
            reason: reason.into(),
        }
    }

    pub fn is_field(&self) -> bool {
        matches!(self, Violation::Field { .. })
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Violation::Composite { .. })
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self, Violation::Aggregate { .. })
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Field { field, reason } => write!(f, "{}: {}", field, reason),
            Violation::Composite { directive, reason } => write!(f, "{}: {}", directive, reason),
            Violation::Aggregate { reason } => write!(f, "command: {}", reason),
        }
    }
}

/// Every violation found in one validation pass, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    pub fn extend(&mut self, other: ValidationReport) {
        self.violations.extend(other.violations);
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Turn the report into a `Result`, attaching `subject` to the error.
    pub fn into_result<T>(self, subject: &str, value: T) -> Result<T, BuildError> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(BuildError::Invalid {
                subject: subject.to_string(),
                report: self,
            })
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.violations.iter().map(|v| v.to_string()).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl From<Violation> for ValidationReport {
    fn from(violation: Violation) -> Self {
        Self {
            violations: vec![violation],
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    #[error("{subject} is not valid: {report}")]
    Invalid {
        subject: String,
        report: ValidationReport,
    },
}

impl BuildError {
    pub fn report(&self) -> &ValidationReport {
        match self {
            BuildError::Invalid { report, .. } => report,
        }
    }

    pub fn violations(&self) -> &[Violation] {
        self.report().violations()
    }
}

pub type BuildResult<T> = Result<T, BuildError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_is_ok() {
        let report = ValidationReport::new();
        assert_eq!(report.into_result("codec", 7), Ok(7));
    }

    #[test]
    fn test_report_keeps_every_violation() {
        let mut report = ValidationReport::new();
        report.push(Violation::field("width_multiplier", "must be between 1 and 10"));
        report.push(Violation::field("height_multiplier", "must be between 1 and 10"));

        let err = report.into_result("scale filter", ()).unwrap_err();
        assert_eq!(err.violations().len(), 2);
        assert!(err.report().violations().iter().all(Violation::is_field));
        assert!(err.to_string().contains("width_multiplier"));
        assert!(err.to_string().contains("height_multiplier"));
    }

    #[test]
    fn test_violation_kinds() {
        assert!(Violation::field("a", "b").is_field());
        assert!(Violation::composite("codec", "undefined").is_composite());
        assert!(Violation::aggregate("missing input").is_aggregate());
        assert_eq!(
            Violation::aggregate("input path is required").to_string(),
            "command: input path is required"
        );
    }
}
