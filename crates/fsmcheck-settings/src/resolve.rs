use crate::model::{FsmcheckConfigV1, LevelConfig};
use crate::presets;
use anyhow::Context;
use camino::Utf8PathBuf;
use fsmcheck_domain::{CategoryId, ComplianceLevel, Enforcement, LevelCatalog};
use std::time::Duration;

#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub level: Option<String>,
    pub server_url: Option<String>,
    pub max_bytecode_version: Option<u32>,
    pub firstspirit_version: Option<String>,
    pub report_dir: Option<Utf8PathBuf>,
}

#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    pub effective: EffectiveConfig,
}

/// Fully defaulted settings for one check run.
#[derive(Clone, Debug)]
pub struct EffectiveConfig {
    pub server_url: Option<String>,
    pub username: Option<String>,
    pub catalog: LevelCatalog,
    pub enforcement: Enforcement,
    pub max_bytecode_version: u32,
    pub firstspirit_version: Option<String>,
    pub whitelist: Vec<String>,
    pub content_creator_components: Vec<String>,
    pub report_dir: Utf8PathBuf,
    pub timeout: Duration,
    pub retry_attempts: u32,
    pub retry_delay: Duration,
}

pub fn resolve_config(
    cfg: FsmcheckConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    let catalog = if cfg.levels.is_empty() {
        presets::default_catalog()
    } else {
        build_catalog(&cfg.levels).context("invalid level table")?
    };

    let level_name = overrides
        .level
        .clone()
        .or(cfg.compliance_level.clone())
        .unwrap_or_else(|| presets::DEFAULT_LEVEL.to_string());
    let enforcement = Enforcement::resolve(&catalog, &level_name).with_context(|| {
        let known: Vec<&str> = catalog.levels().iter().map(|l| l.name()).collect();
        format!(
            "unknown compliance level: {level_name} (expected one of {})",
            known.join("|")
        )
    })?;

    let retry_attempts = cfg
        .retry_attempts
        .unwrap_or(presets::DEFAULT_RETRY_ATTEMPTS);
    if retry_attempts == 0 {
        anyhow::bail!("retry_attempts must be at least 1");
    }

    let server_url = overrides
        .server_url
        .clone()
        .or(cfg.server_url.clone())
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty());

    Ok(ResolvedConfig {
        effective: EffectiveConfig {
            server_url,
            username: cfg.username.filter(|u| !u.is_empty()),
            catalog,
            enforcement,
            max_bytecode_version: overrides
                .max_bytecode_version
                .or(cfg.max_bytecode_version)
                .unwrap_or(presets::DEFAULT_MAX_BYTECODE_VERSION),
            firstspirit_version: overrides
                .firstspirit_version
                .or(cfg.firstspirit_version)
                .filter(|v| !v.trim().is_empty()),
            whitelist: cfg.whitelist,
            content_creator_components: cfg.content_creator_components,
            report_dir: overrides
                .report_dir
                .or(cfg.report_dir.map(Utf8PathBuf::from))
                .unwrap_or_else(|| Utf8PathBuf::from(presets::DEFAULT_REPORT_DIR)),
            timeout: Duration::from_secs(
                cfg.timeout_secs.unwrap_or(presets::DEFAULT_TIMEOUT_SECS),
            ),
            retry_attempts,
            retry_delay: Duration::from_secs(
                cfg.retry_delay_secs
                    .unwrap_or(presets::DEFAULT_RETRY_DELAY_SECS),
            ),
        },
    })
}

fn build_catalog(levels: &[LevelConfig]) -> anyhow::Result<LevelCatalog> {
    let levels = levels
        .iter()
        .map(|l| {
            if l.name.trim().is_empty() {
                anyhow::bail!("level with rank {} has an empty name", l.rank);
            }
            Ok(ComplianceLevel::new(
                l.name.trim(),
                l.rank,
                l.categories.iter().map(|c| CategoryId::new(c.trim())).collect(),
            ))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(LevelCatalog::new(levels)?)
}
