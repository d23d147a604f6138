//! Stable DTOs and IDs used across the fsmcheck workspace.
//!
//! This crate is intentionally boring:
//! - wire payloads exchanged with the isolation check service
//! - the verification result handed back to callers
//! - stable message strings and endpoint paths

#![forbid(unsafe_code)]

pub mod ids;
pub mod result;
pub mod wire;

pub use result::{CheckStatus, VerificationResult};
pub use wire::{AnalyzeResponse, CategorySummary, CheckedFsmFile, FailedModule, ViolatingSymbol};
