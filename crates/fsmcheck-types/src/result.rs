use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids;

/// Outcome class of one check run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckStatus {
    Valid,
    Invalid,
    ConnectionFailed,
}

/// Immutable verdict returned by a check.
///
/// `module_errors` is only populated when the service could not process an archive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VerificationResult {
    status: CheckStatus,
    message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    module_errors: Vec<String>,
}

impl VerificationResult {
    pub fn valid(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Valid,
            message: message.into(),
            module_errors: Vec::new(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Invalid,
            message: message.into(),
            module_errors: Vec::new(),
        }
    }

    pub fn unprocessable(module_errors: Vec<String>) -> Self {
        Self {
            status: CheckStatus::Invalid,
            message: ids::MSG_UNABLE_TO_PROCESS.to_string(),
            module_errors,
        }
    }

    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::ConnectionFailed,
            message: message.into(),
            module_errors: Vec::new(),
        }
    }

    /// Result for a run without any archives to check.
    pub fn skipped() -> Self {
        Self::valid(ids::MSG_NO_FILES)
    }

    pub fn status(&self) -> CheckStatus {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn module_errors(&self) -> &[String] {
        &self.module_errors
    }

    pub fn is_valid(&self) -> bool {
        self.status == CheckStatus::Valid
    }
}
