// Shared contract for codec and filter sub-builders

use crate::error::{BuildResult, ValidationReport};
use serde::{Deserialize, Serialize};

/// Side of the input path a directive's tokens land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    BeforeInput,
    #[default]
    AfterInput,
}

/// A self-contained unit that validates itself and renders its own tokens.
///
/// Implementations collect every field-level violation first and only run
/// their cross-field rules when no field-level violation was found.
pub trait Directive {
    /// Human readable name used as the subject of validation errors.
    fn name(&self) -> &'static str;

    fn validate(&self) -> ValidationReport;

    /// Tokens for this directive, assuming `validate` came back empty.
    fn tokens(&self) -> Vec<String>;

    fn placement(&self) -> Placement {
        Placement::AfterInput
    }

    /// Validate, then render. Never returns a partial token list.
    fn generate(&self) -> BuildResult<Vec<String>> {
        let report = self.validate();
        report.into_result(self.name(), ())?;
        Ok(self.tokens())
    }
}
