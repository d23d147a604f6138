use fsmcheck_domain::{CategoryId, ComplianceLevel, LevelCatalog};

pub const DEFAULT_LEVEL: &str = "DEFAULT";
/// Class-file major version 61 (Java 17).
pub const DEFAULT_MAX_BYTECODE_VERSION: u32 = 61;
pub const DEFAULT_REPORT_DIR: &str = "build";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 5;

/// Built-in taxonomy used when the config does not declare its own levels.
///
/// Keep this small and readable. Custom taxonomies belong in repo config.
pub fn default_catalog() -> LevelCatalog {
    let level = |name: &str, rank: u32, categories: &[&str]| {
        ComplianceLevel::new(
            name,
            rank,
            categories.iter().map(|c| CategoryId::from(*c)).collect(),
        )
    };

    LevelCatalog::new(vec![
        level("MINIMAL", 0, &["IMPL_USAGE", "RUNTIME_USAGE"]),
        level(DEFAULT_LEVEL, 1, &["NON_ISOLATED_API", "INTERNAL_API"]),
        level("HIGHEST", 2, &["DEPRECATED_API"]),
    ])
    .unwrap_or_else(|err| unreachable!("built-in level catalog is invalid: {err}"))
}
