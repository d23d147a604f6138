//! Property tests for the level catalog and policy evaluation.

use crate::engine::{evaluate, tally_categories};
use crate::model::{CategoryId, ComplianceLevel, LevelCatalog};
use crate::policy::Enforcement;
use fsmcheck_types::CategorySummary;
use proptest::prelude::*;

/// Catalog with `sizes.len()` levels, ranks rotated by `rank_seed` so declaration order and
/// rank order differ, and disjoint category names.
fn build_catalog(sizes: &[usize], rank_seed: u32) -> LevelCatalog {
    let n = sizes.len() as u32;
    let levels = sizes
        .iter()
        .enumerate()
        .map(|(i, &size)| {
            let rank = (i as u32 + rank_seed % n) % n;
            let cats = (0..size)
                .map(|j| CategoryId::new(format!("L{rank}_C{j}")))
                .collect();
            ComplianceLevel::new(format!("LEVEL_{rank}"), rank, cats)
        })
        .collect();
    LevelCatalog::new(levels).expect("generated catalog is valid")
}

fn arb_catalog() -> impl Strategy<Value = LevelCatalog> {
    (prop::collection::vec(0usize..5, 1..6), any::<u32>())
        .prop_map(|(sizes, seed)| build_catalog(&sizes, seed))
}

proptest! {
    /// A stricter level never enforces fewer categories than a weaker one.
    #[test]
    fn stricter_levels_are_supersets(catalog in arb_catalog()) {
        for weaker in catalog.levels() {
            for stricter in catalog.levels().iter().filter(|l| l.rank() > weaker.rank()) {
                let weak = catalog.all_categories(weaker);
                let strict = catalog.all_categories(stricter);
                prop_assert!(
                    weak.is_subset(&strict),
                    "{} ({:?}) is not contained in {} ({:?})",
                    weaker.name(), weak, stricter.name(), strict
                );
            }
        }
    }

    /// The strictest level enforces every known category.
    #[test]
    fn strictest_level_enforces_everything(catalog in arb_catalog()) {
        let strictest = catalog.levels().last().expect("non-empty");
        let all = catalog.all_categories(strictest);
        prop_assert_eq!(all.len(), catalog.known_categories().len());
    }

    /// If a run passes at some level it also passes at every weaker level.
    #[test]
    fn passing_is_monotone_in_rank(
        catalog in arb_catalog(),
        counts in prop::collection::vec(0u64..3, 0..25),
    ) {
        let summaries: Vec<CategorySummary> = catalog
            .known_categories()
            .iter()
            .zip(counts.iter())
            .map(|(c, &count)| CategorySummary {
                category: c.to_string(),
                description: String::new(),
                count,
            })
            .collect();
        let tallies = tally_categories(&catalog, &summaries);

        let outcomes: Vec<bool> = catalog
            .levels()
            .iter()
            .map(|l| {
                let enforcement = Enforcement::resolve(&catalog, l.name()).expect("level");
                evaluate(&enforcement, &tallies).success
            })
            .collect();

        for pair in outcomes.windows(2) {
            prop_assert!(pair[0] || !pair[1], "stricter level passed while weaker failed");
        }
    }
}
