//! Use case orchestration for fsmcheck.
//!
//! This crate provides the application layer: the compliance verifier that drives the remote
//! service, the domain policy, and the report sinks. The CLI crate depends on this; it only
//! handles argument parsing and process I/O.

#![forbid(unsafe_code)]

mod run;
mod verifier;

pub use run::{RunInput, RunOutput, load_config, run_check, verdict_exit_code};
pub use verifier::{CheckRequest, Verifier};
