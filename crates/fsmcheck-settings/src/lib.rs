//! Config parsing and compliance level resolution.
//!
//! This crate is intentionally IO-free: it parses and resolves configuration provided as strings.

#![forbid(unsafe_code)]

mod model;
mod presets;
mod resolve;

pub use model::{FsmcheckConfigV1, LevelConfig};
pub use presets::default_catalog;
pub use resolve::{EffectiveConfig, Overrides, ResolvedConfig};

/// Parse `fsmcheck.toml` (or equivalent) into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<FsmcheckConfigV1> {
    let cfg: FsmcheckConfigV1 = toml::from_str(input)?;
    Ok(cfg)
}

/// Resolve the effective config used by the verifier (presets + custom levels + overrides).
pub fn resolve_config(
    cfg: FsmcheckConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    resolve::resolve_config(cfg, overrides)
}
