use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Name of one violation category as reported by the isolation check service.
///
/// Categories are data, not a closed enum: the service owns the taxonomy and may grow it
/// without a new fsmcheck release.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(String);

impl CategoryId {
    pub fn new<S: Into<String>>(s: S) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CategoryId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A named policy bundle.
///
/// `rank` orders levels explicitly; a level enforces its own `direct` categories plus the
/// direct categories of every level with a lower or equal rank.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComplianceLevel {
    name: String,
    rank: u32,
    direct: Vec<CategoryId>,
}

impl ComplianceLevel {
    pub fn new<S: Into<String>>(name: S, rank: u32, direct: Vec<CategoryId>) -> Self {
        let mut seen = BTreeSet::new();
        let direct = direct
            .into_iter()
            .filter(|c| seen.insert(c.clone()))
            .collect();
        Self {
            name: name.into(),
            rank,
            direct,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rank(&self) -> u32 {
        self.rank
    }

    pub fn direct_categories(&self) -> &[CategoryId] {
        &self.direct
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("no compliance levels defined")]
    Empty,
    #[error("compliance level '{0}' is defined more than once")]
    DuplicateName(String),
    #[error("compliance levels '{first}' and '{second}' share rank {rank}")]
    DuplicateRank {
        rank: u32,
        first: String,
        second: String,
    },
    #[error("category '{category}' is owned by both '{first}' and '{second}'")]
    SharedCategory {
        category: String,
        first: String,
        second: String,
    },
}

/// Immutable set of compliance levels plus the taxonomy they cover.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelCatalog {
    levels: Vec<ComplianceLevel>,
    categories: Vec<CategoryId>,
    owners: BTreeMap<CategoryId, usize>,
}

impl LevelCatalog {
    /// Build a catalog, ordering levels by rank (declaration order is irrelevant).
    ///
    /// Known categories are listed level by level in rank order, each level's categories in
    /// the order they were declared.
    pub fn new(mut levels: Vec<ComplianceLevel>) -> Result<Self, CatalogError> {
        if levels.is_empty() {
            return Err(CatalogError::Empty);
        }
        levels.sort_by_key(|l| l.rank);

        let mut names = BTreeSet::new();
        for level in &levels {
            if !names.insert(level.name.to_ascii_lowercase()) {
                return Err(CatalogError::DuplicateName(level.name.clone()));
            }
        }
        for pair in levels.windows(2) {
            if pair[0].rank == pair[1].rank {
                return Err(CatalogError::DuplicateRank {
                    rank: pair[0].rank,
                    first: pair[0].name.clone(),
                    second: pair[1].name.clone(),
                });
            }
        }

        let mut categories = Vec::new();
        let mut owners: BTreeMap<CategoryId, usize> = BTreeMap::new();
        for (idx, level) in levels.iter().enumerate() {
            for category in &level.direct {
                if let Some(&prev) = owners.get(category) {
                    return Err(CatalogError::SharedCategory {
                        category: category.to_string(),
                        first: levels[prev].name.clone(),
                        second: level.name.clone(),
                    });
                }
                owners.insert(category.clone(), idx);
                categories.push(category.clone());
            }
        }

        Ok(Self {
            levels,
            categories,
            owners,
        })
    }

    /// Levels in ascending rank order.
    pub fn levels(&self) -> &[ComplianceLevel] {
        &self.levels
    }

    /// Case-insensitive lookup by name.
    pub fn level(&self, name: &str) -> Option<&ComplianceLevel> {
        self.levels
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(name))
    }

    /// Every category known to the catalog, independent of any single level.
    pub fn known_categories(&self) -> &[CategoryId] {
        &self.categories
    }

    pub fn is_known(&self, category: &CategoryId) -> bool {
        self.owners.contains_key(category)
    }

    /// Cumulative set enforced by `level`: the union of the direct categories of all levels
    /// whose rank is lower than or equal to its rank.
    pub fn all_categories(&self, level: &ComplianceLevel) -> BTreeSet<CategoryId> {
        self.levels
            .iter()
            .filter(|l| l.rank <= level.rank)
            .flat_map(|l| l.direct.iter().cloned())
            .collect()
    }

    /// The level that lists `category` directly, if any.
    pub fn owning_level(&self, category: &CategoryId) -> Option<&ComplianceLevel> {
        self.owners.get(category).map(|&idx| &self.levels[idx])
    }
}
