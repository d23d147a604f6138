use crate::model::{CategoryId, LevelCatalog};
use crate::policy::Enforcement;
use fsmcheck_types::CategorySummary;
use std::collections::BTreeSet;

/// Violation count and service-supplied description for one category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryTally {
    pub category: CategoryId,
    pub description: String,
    pub count: u64,
}

/// Policy verdict over a full set of tallies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicyOutcome {
    pub success: bool,
    /// Enforced categories with at least one violation, in tally order.
    pub violated: Vec<CategoryId>,
    /// Categories with violations that the configured level does not enforce.
    pub ignored: Vec<CategoryId>,
}

/// Align the service's category list with the catalog taxonomy.
///
/// Every known category appears exactly once, in catalog order; a known category the service
/// did not mention counts as zero violations. Categories only the service knows are appended
/// afterwards in response order so they are still reported.
pub fn tally_categories(catalog: &LevelCatalog, summaries: &[CategorySummary]) -> Vec<CategoryTally> {
    let mut tallies: Vec<CategoryTally> = catalog
        .known_categories()
        .iter()
        .map(|category| {
            let summary = summaries.iter().find(|s| s.category == category.as_str());
            CategoryTally {
                category: category.clone(),
                description: summary.map(|s| s.description.clone()).unwrap_or_default(),
                count: summary.map(|s| s.count).unwrap_or(0),
            }
        })
        .collect();

    let mut extra_seen = BTreeSet::new();
    for summary in summaries {
        let category = CategoryId::new(summary.category.clone());
        if catalog.is_known(&category) || !extra_seen.insert(category.clone()) {
            continue;
        }
        tallies.push(CategoryTally {
            category,
            description: summary.description.clone(),
            count: summary.count,
        });
    }

    tallies
}

/// A run fails iff an enforced category has a non-zero count.
pub fn evaluate(enforcement: &Enforcement, tallies: &[CategoryTally]) -> PolicyOutcome {
    let mut violated = Vec::new();
    let mut ignored = Vec::new();
    for tally in tallies.iter().filter(|t| t.count > 0) {
        if enforcement.is_enforced(&tally.category) {
            violated.push(tally.category.clone());
        } else {
            ignored.push(tally.category.clone());
        }
    }

    PolicyOutcome {
        success: violated.is_empty(),
        violated,
        ignored,
    }
}
