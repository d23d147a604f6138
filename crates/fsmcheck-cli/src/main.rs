//! CLI entry point for fsmcheck.
//!
//! This module is intentionally thin: it handles argument parsing, I/O, and exit codes.
//! All business logic lives in the `fsmcheck-app` crate.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use fsmcheck_app::{RunInput, load_config, run_check, verdict_exit_code};
use fsmcheck_settings::Overrides;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "FSMCHECK_LOG";
const PASSWORD_ENV: &str = "FSMCHECK_PASSWORD";

#[derive(Parser, Debug)]
#[command(
    name = "fsmcheck",
    version,
    about = "Module isolation compliance checks for FirstSpirit module archives"
)]
struct Cli {
    /// Path to fsmcheck config TOML.
    #[arg(long, default_value = "fsmcheck.toml")]
    config: Utf8PathBuf,

    /// Override compliance level (MINIMAL|DEFAULT|HIGHEST or custom).
    #[arg(long)]
    level: Option<String>,

    /// Override the isolation check service base URL.
    #[arg(long)]
    server_url: Option<String>,

    /// Override the highest permitted class-file major version.
    #[arg(long)]
    max_bytecode_version: Option<u32>,

    /// Override the target FirstSpirit version.
    #[arg(long)]
    firstspirit_version: Option<String>,

    /// Override the directory receiving fsmchecker-reports/.
    #[arg(long)]
    report_dir: Option<Utf8PathBuf>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Upload module archives and verify them against the configured compliance level.
    Check {
        /// Module archives (.fsm) to check.
        files: Vec<Utf8PathBuf>,

        /// Also check every *.fsm file below this directory.
        #[arg(long)]
        dir: Option<Utf8PathBuf>,
    },

    /// List compliance levels with the categories each one enforces.
    Levels,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            level: self.level.clone(),
            server_url: self.server_url.clone(),
            max_bytecode_version: self.max_bytecode_version,
            firstspirit_version: self.firstspirit_version.clone(),
            report_dir: self.report_dir.clone(),
        }
    }

    /// Missing config file is allowed (defaults apply).
    fn config_text(&self) -> String {
        std::fs::read_to_string(&self.config).unwrap_or_default()
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging();

    match cli.cmd {
        Commands::Check { ref files, ref dir } => cmd_check(&cli, files, dir.as_deref()),
        Commands::Levels => cmd_levels(&cli),
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_check(cli: &Cli, files: &[Utf8PathBuf], dir: Option<&Utf8Path>) -> anyhow::Result<()> {
    let result = (|| -> anyhow::Result<i32> {
        let files = collect_files(files, dir)?;
        debug!(count = files.len(), "collected module archives");

        let cfg_text = cli.config_text();
        let output = run_check(RunInput {
            config_text: &cfg_text,
            overrides: cli.overrides(),
            files,
            password: std::env::var(PASSWORD_ENV).ok().filter(|p| !p.is_empty()),
        })?;

        println!("{}", output.result.message());
        for module_error in output.result.module_errors() {
            eprintln!("{module_error}");
        }
        Ok(verdict_exit_code(output.result.status()))
    })();

    match result {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("fsmcheck error: {err:#}");
            std::process::exit(1);
        }
    }
}

/// Explicit files first (in argument order), then `*.fsm` files under `dir` sorted by path.
fn collect_files(files: &[Utf8PathBuf], dir: Option<&Utf8Path>) -> anyhow::Result<Vec<Utf8PathBuf>> {
    let mut collected = Vec::new();
    for file in files {
        if !file.is_file() {
            anyhow::bail!("module file not found: {file}");
        }
        collected.push(file.clone());
    }

    if let Some(dir) = dir {
        if !dir.is_dir() {
            anyhow::bail!("module directory not found: {dir}");
        }
        let mut found = Vec::new();
        for entry in walkdir::WalkDir::new(dir) {
            let entry = entry.with_context(|| format!("walk {dir}"))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = Utf8PathBuf::from_path_buf(entry.into_path())
                .map_err(|p| anyhow::anyhow!("non UTF-8 path: {}", p.display()))?;
            if path.extension() == Some("fsm") {
                found.push(path);
            }
        }
        found.sort();
        for path in found {
            if !collected.contains(&path) {
                collected.push(path);
            }
        }
    }

    Ok(collected)
}

fn cmd_levels(cli: &Cli) -> anyhow::Result<()> {
    let resolved = match load_config(&cli.config_text(), cli.overrides()) {
        Ok(resolved) => resolved,
        Err(err) => {
            eprintln!("fsmcheck error: {err:#}");
            std::process::exit(1);
        }
    };
    let eff = &resolved.effective;

    for level in eff.catalog.levels() {
        let enforced = eff.catalog.all_categories(level);
        let categories: Vec<&str> = eff
            .catalog
            .known_categories()
            .iter()
            .filter(|c| enforced.contains(*c))
            .map(|c| c.as_str())
            .collect();
        let marker = if level.name() == eff.enforcement.level() {
            " (configured)"
        } else {
            ""
        };
        println!(
            "{} (rank {}){}: {}",
            level.name(),
            level.rank(),
            marker,
            categories.join(", ")
        );
    }
    Ok(())
}
