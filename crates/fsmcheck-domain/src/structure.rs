//! Structural checks on the analyze payload.
//!
//! These run before any category policy and are terminal: an archive the service cannot
//! parse, or one that breaks a hard packaging rule, fails regardless of the level.

use fsmcheck_types::{AnalyzeResponse, VerificationResult, ids};

/// Returns the terminal verdict for a structurally broken upload, or `None` to continue
/// with category evaluation.
///
/// Checks run in a fixed order: failed modules, bytecode level, platform artifacts.
pub fn check_structure(
    response: &AnalyzeResponse,
    max_bytecode_version: u32,
) -> Option<VerificationResult> {
    if !response.failed_modules.is_empty() {
        let module_errors = response
            .failed_modules
            .iter()
            .map(|m| {
                format!(
                    "{}{}{}",
                    m.failed_file,
                    ids::MODULE_ERROR_SEPARATOR,
                    m.error_message
                )
            })
            .collect();
        return Some(VerificationResult::unprocessable(module_errors));
    }

    let invalid_bytecode: Vec<&str> = response
        .checked_fsm_files
        .iter()
        .flat_map(|f| f.jars_with_invalid_bytecode.iter().map(String::as_str))
        .collect();
    if !invalid_bytecode.is_empty() {
        return Some(VerificationResult::invalid(format!(
            "Module contains jars with bytecode above the allowed maximum level {}: {}",
            max_bytecode_version,
            invalid_bytecode.join(", ")
        )));
    }

    let platform_artifacts: Vec<&str> = response
        .checked_fsm_files
        .iter()
        .flat_map(|f| f.detected_first_spirit_artifacts.iter().map(String::as_str))
        .collect();
    if !platform_artifacts.is_empty() {
        return Some(VerificationResult::invalid(format!(
            "Module contains FirstSpirit artifacts which must not be packaged: {}",
            platform_artifacts.join(", ")
        )));
    }

    None
}
