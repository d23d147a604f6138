use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// `fsmcheck.toml` schema v1.
///
/// This is a *user-facing* config model: every key is optional and defaults are applied during
/// resolution.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FsmcheckConfigV1 {
    /// Optional schema string for tooling (`fsmcheck.config.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Base URL of the isolation check service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,

    /// Basic-auth user. The password is never stored in the config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance_level: Option<String>,

    /// Highest class-file major version permitted inside the archives.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_bytecode_version: Option<u32>,

    /// Target platform version used by the service to filter its API knowledge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firstspirit_version: Option<String>,

    /// Resource identifiers exempted from violation reporting.
    #[serde(default)]
    pub whitelist: Vec<String>,

    #[serde(default)]
    pub content_creator_components: Vec<String>,

    /// Directory under which `fsmchecker-reports/` is created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_dir: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_attempts: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_delay_secs: Option<u64>,

    /// Custom level table. Replaces the built-in taxonomy when non-empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub levels: Vec<LevelConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LevelConfig {
    pub name: String,
    /// Explicit ordering; higher ranks enforce everything lower ranks do.
    pub rank: u32,
    /// Categories this level adds on top of all lower-ranked levels.
    #[serde(default)]
    pub categories: Vec<String>,
}
