// Codec directive: -c[:stream] <name|copy>

use crate::directive::{Directive, Placement};
use crate::error::{ValidationReport, Violation};
use crate::options::{ChoiceSet, StreamSpecifier};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecDirective {
    pub stream: Option<StreamSpecifier>,
    pub codec: Option<String>,
    pub copy: bool,
    pub placement: Placement,
}

impl CodecDirective {
    /// Copy the stream without re-encoding.
    pub fn copy() -> Self {
        Self {
            copy: true,
            ..Self::default()
        }
    }

    pub fn named(codec: impl Into<String>) -> Self {
        Self {
            codec: Some(codec.into()),
            ..Self::default()
        }
    }

    pub fn stream(mut self, stream: StreamSpecifier) -> Self {
        self.stream = Some(stream);
        self
    }

    pub fn before_input(mut self) -> Self {
        self.placement = Placement::BeforeInput;
        self
    }

    fn field_violations(&self, catalog: Option<&ChoiceSet>) -> ValidationReport {
        let mut report = ValidationReport::new();
        if let Some(name) = &self.codec {
            if name.trim().is_empty() {
                report.push(Violation::field("codec", "codec name must not be empty"));
            } else if let Some(catalog) = catalog {
                if let Err(violation) = catalog.check("codec", name) {
                    report.push(violation);
                }
            }
        }
        report
    }

    fn composite_violations(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        match (self.copy, self.codec.is_some()) {
            (false, false) => report.push(Violation::composite(self.name(), "codec is not defined")),
            (true, true) => report.push(Violation::composite(
                self.name(),
                "copy and a named codec can not be set at the same time",
            )),
            _ => {}
        }
        report
    }

    /// Validate, also requiring the codec name to be listed in `catalog`.
    pub fn validate_against(&self, catalog: &ChoiceSet) -> ValidationReport {
        let report = self.field_violations(Some(catalog));
        if !report.is_empty() {
            return report;
        }
        self.composite_violations()
    }
}

impl Directive for CodecDirective {
    fn name(&self) -> &'static str {
        "codec"
    }

    fn validate(&self) -> ValidationReport {
        let report = self.field_violations(None);
        if !report.is_empty() {
            return report;
        }
        self.composite_violations()
    }

    fn tokens(&self) -> Vec<String> {
        let flag = match self.stream {
            Some(stream) => format!("-c:{}", stream.letter()),
            None => "-c".to_string(),
        };
        let value = if self.copy {
            "copy".to_string()
        } else {
            self.codec.clone().unwrap_or_default()
        };
        vec![flag, value]
    }

    fn placement(&self) -> Placement {
        self.placement
    }
}
