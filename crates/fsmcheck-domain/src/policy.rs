use crate::model::{CategoryId, LevelCatalog};
use std::collections::{BTreeMap, BTreeSet};

/// Level-policy context for one check run.
///
/// Resolved once from a catalog and a level name, then shared read-only by the verifier and
/// every report sink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Enforcement {
    level: String,
    enforced: BTreeSet<CategoryId>,
    owners: BTreeMap<CategoryId, String>,
}

impl Enforcement {
    /// Resolve `level_name` against `catalog`. Returns `None` for an unknown level.
    pub fn resolve(catalog: &LevelCatalog, level_name: &str) -> Option<Self> {
        let level = catalog.level(level_name)?;
        let owners = catalog
            .known_categories()
            .iter()
            .filter_map(|c| {
                catalog
                    .owning_level(c)
                    .map(|owner| (c.clone(), owner.name().to_string()))
            })
            .collect();

        Some(Self {
            level: level.name().to_string(),
            enforced: catalog.all_categories(level),
            owners,
        })
    }

    /// Canonical name of the configured level.
    pub fn level(&self) -> &str {
        &self.level
    }

    pub fn is_enforced(&self, category: &CategoryId) -> bool {
        self.enforced.contains(category)
    }

    pub fn enforced(&self) -> &BTreeSet<CategoryId> {
        &self.enforced
    }

    /// Name of the level that owns `category` directly, if any.
    pub fn owning_level(&self, category: &CategoryId) -> Option<&str> {
        self.owners.get(category).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ComplianceLevel;

    fn catalog() -> LevelCatalog {
        LevelCatalog::new(vec![
            ComplianceLevel::new("MINIMAL", 0, vec!["A".into()]),
            ComplianceLevel::new("DEFAULT", 1, vec!["B".into()]),
        ])
        .expect("valid catalog")
    }

    #[test]
    fn resolve_uses_canonical_level_name() {
        let enforcement = Enforcement::resolve(&catalog(), "default").expect("known level");
        assert_eq!(enforcement.level(), "DEFAULT");
        assert!(enforcement.is_enforced(&"A".into()));
        assert!(enforcement.is_enforced(&"B".into()));
    }

    #[test]
    fn weaker_level_does_not_enforce_stricter_categories() {
        let enforcement = Enforcement::resolve(&catalog(), "MINIMAL").expect("known level");
        assert!(enforcement.is_enforced(&"A".into()));
        assert!(!enforcement.is_enforced(&"B".into()));
        assert_eq!(enforcement.owning_level(&"B".into()), Some("DEFAULT"));
    }

    #[test]
    fn unknown_level_does_not_resolve() {
        assert!(Enforcement::resolve(&catalog(), "STRICTEST").is_none());
    }
}
