//! Pure policy evaluation (no IO).
//!
//! Input: a level catalog and the payloads returned by the isolation check service.
//! Output: structural verdicts, per-category tallies, and the policy outcome.

#![forbid(unsafe_code)]

pub mod model;
pub mod policy;
pub mod structure;

mod engine;

#[cfg(test)]
mod proptest;

pub use engine::{CategoryTally, PolicyOutcome, evaluate, tally_categories};
pub use model::{CatalogError, CategoryId, ComplianceLevel, LevelCatalog};
pub use policy::Enforcement;
pub use structure::check_structure;
