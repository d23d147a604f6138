//! Stable identifiers: service endpoints, report locations, and fixed messages.
//!
//! Callers and CI tooling match on these strings, so changing one is a breaking change.

// Service endpoints (relative to the configured base URL).
pub const ENDPOINT_IGNORED_RESOURCES: &[&str] = &["rest", "ignored-resources"];
pub const ENDPOINT_CONTENT_CREATOR_COMPONENTS: &[&str] = &["rest", "content-creator-components"];
pub const ENDPOINT_UPLOAD: &[&str] = &["rest", "upload"];
pub const ENDPOINT_ANALYZE: &[&str] = &["rest", "analyze"];
pub const ENDPOINT_CATEGORIES: &[&str] = &["rest", "categories"];
pub const ENDPOINT_CLASSES_FOR_CATEGORY: &[&str] = &["rest", "classesforcategory"];

// Query parameters
pub const PARAM_VERSION: &str = "version";
pub const PARAM_MAX_BYTECODE_VERSION: &str = "maxBytecodeVersion";
pub const PARAM_CATEGORY: &str = "category";

/// Multipart field name used for every uploaded artifact.
pub const UPLOAD_PART_NAME: &str = "file";

// Structured report location, relative to the configured report directory.
pub const REPORT_SUBDIR: &str = "fsmchecker-reports";
pub const REPORT_FILE_NAME: &str = "TEST-complianceCheck.xml";

// Messages
pub const MSG_NO_FILES: &str =
    "No FirstSpirit module files (.fsm) were configured. -> skipping check.";
pub const MSG_UNABLE_TO_PROCESS: &str = "Unable to process module";
pub const MSG_CONNECTION_FAILED_PREFIX: &str =
    "Connection to isolation check service failed during";

/// Separator between a failed file and its reason in `module_errors`.
pub const MODULE_ERROR_SEPARATOR: &str = " --> ";

/// Synthetic test case emitted for a category without violations.
pub const CASE_NO_VIOLATIONS: &str = "noViolations";
