//! JSON payloads returned by the isolation check service.
//!
//! Every collection defaults to empty so a sparse response from an older service
//! version still decodes.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Response of `GET /rest/analyze`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub failed_modules: Vec<FailedModule>,
    #[serde(default)]
    pub checked_fsm_files: Vec<CheckedFsmFile>,
}

/// A module archive the service could not process at all.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FailedModule {
    #[serde(default)]
    pub failed_file: String,
    #[serde(default)]
    pub error_message: String,
}

/// Per-archive analysis outcome.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckedFsmFile {
    /// Nested jars compiled for a bytecode level above the configured maximum.
    #[serde(default)]
    pub jars_with_invalid_bytecode: Vec<String>,
    /// Nested artifacts that belong to the platform itself and must not be shipped.
    #[serde(default)]
    pub detected_first_spirit_artifacts: Vec<String>,
}

/// One entry of `GET /rest/categories`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CategorySummary {
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub count: u64,
}

/// One entry of `GET /rest/classesforcategory`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ViolatingSymbol {
    pub name: String,
    #[serde(default)]
    pub number_of_usages: u64,
}
