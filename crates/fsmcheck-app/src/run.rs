//! The `check` use case: resolve configuration, wire the HTTP connector, run the verifier.

use crate::verifier::{CheckRequest, Verifier};
use anyhow::Context;
use camino::Utf8PathBuf;
use fsmcheck_client::{HttpConnector, HttpSettings, RetryPolicy};
use fsmcheck_settings::{Overrides, ResolvedConfig};
use fsmcheck_types::{CheckStatus, VerificationResult};

/// Input for the check use case.
#[derive(Clone, Debug)]
pub struct RunInput<'a> {
    /// Config file contents (empty string if not found).
    pub config_text: &'a str,
    /// CLI overrides.
    pub overrides: Overrides,
    /// Module archives to check, in submission order.
    pub files: Vec<Utf8PathBuf>,
    /// Basic-auth password, taken from the environment by the caller.
    pub password: Option<String>,
}

#[derive(Clone, Debug)]
pub struct RunOutput {
    pub result: VerificationResult,
    pub resolved_config: ResolvedConfig,
}

/// Parse and resolve config text; empty text means defaults.
pub fn load_config(config_text: &str, overrides: Overrides) -> anyhow::Result<ResolvedConfig> {
    let cfg = if config_text.trim().is_empty() {
        fsmcheck_settings::FsmcheckConfigV1::default()
    } else {
        fsmcheck_settings::parse_config_toml(config_text).context("parse config")?
    };
    fsmcheck_settings::resolve_config(cfg, overrides).context("resolve config")
}

pub fn run_check(input: RunInput<'_>) -> anyhow::Result<RunOutput> {
    let resolved = load_config(input.config_text, input.overrides)?;
    let eff = &resolved.effective;

    // Without files no request is ever sent, so the URL may be absent.
    let base_url = match &eff.server_url {
        Some(url) => url.clone(),
        None if input.files.is_empty() => String::new(),
        None => anyhow::bail!("server_url is not configured (set it in fsmcheck.toml or pass --server-url)"),
    };

    let connector = HttpConnector::new(HttpSettings {
        base_url,
        username: eff.username.clone(),
        password: input.password,
        timeout: eff.timeout,
        retry: RetryPolicy {
            max_attempts: eff.retry_attempts,
            delay: eff.retry_delay,
        },
    });
    let verifier = Verifier::new(connector, eff.catalog.clone(), eff.enforcement.clone());

    let request = CheckRequest {
        files: input.files,
        whitelist: eff.whitelist.clone(),
        content_creator_components: eff.content_creator_components.clone(),
        max_bytecode_version: eff.max_bytecode_version,
        firstspirit_version: eff.firstspirit_version.clone(),
        report_dir: eff.report_dir.clone(),
    };
    let result = verifier.check(&request).context("run isolation check")?;

    Ok(RunOutput {
        result,
        resolved_config: resolved,
    })
}

/// Exit code mapping: `VALID` → 0, `INVALID` → 2, `CONNECTION_FAILED` → 3.
///
/// 1 is left for tool errors (bad config, unreadable inputs).
pub fn verdict_exit_code(status: CheckStatus) -> i32 {
    match status {
        CheckStatus::Valid => 0,
        CheckStatus::Invalid => 2,
        CheckStatus::ConnectionFailed => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        assert_eq!(verdict_exit_code(CheckStatus::Valid), 0);
        assert_eq!(verdict_exit_code(CheckStatus::Invalid), 2);
        assert_eq!(verdict_exit_code(CheckStatus::ConnectionFailed), 3);
    }

    #[test]
    fn empty_run_needs_no_server() {
        let output = run_check(RunInput {
            config_text: "",
            overrides: Overrides::default(),
            files: Vec::new(),
            password: None,
        })
        .expect("skip");
        assert!(output.result.is_valid());
        assert_eq!(
            output.result.message(),
            "No FirstSpirit module files (.fsm) were configured. -> skipping check."
        );
    }

    #[test]
    fn files_without_server_is_a_tool_error() {
        let err = run_check(RunInput {
            config_text: "compliance_level = \"MINIMAL\"",
            overrides: Overrides::default(),
            files: vec![Utf8PathBuf::from("module.fsm")],
            password: None,
        })
        .unwrap_err();
        assert!(err.to_string().contains("server_url is not configured"), "{err}");
    }

    #[test]
    fn bad_config_is_reported_with_context() {
        let err = load_config("max_bytecode_version = \"sixty\"", Overrides::default()).unwrap_err();
        assert!(format!("{err:#}").starts_with("parse config"), "{err:#}");
    }
}
