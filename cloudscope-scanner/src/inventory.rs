use crate::category::Category;
use serde_json::Value;
use std::collections::BTreeMap;

/// Result of fetching one category: provider-native records or a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Records(Vec<Value>),
    Failed(String),
}

impl FetchOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed(_))
    }

    pub fn records(&self) -> &[Value] {
        match self {
            FetchOutcome::Records(records) => records,
            FetchOutcome::Failed(_) => &[],
        }
    }
}

/// Per-category fetch outcomes of one scan.
///
/// Iteration follows category priority order regardless of the order in
/// which fetches completed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inventory {
    outcomes: BTreeMap<Category, FetchOutcome>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Inventory::insert`].
    pub fn with(mut self, category: Category, outcome: FetchOutcome) -> Self {
        self.insert(category, outcome);
        self
    }

    /// Records the outcome for a category, replacing any earlier one.
    pub fn insert(&mut self, category: Category, outcome: FetchOutcome) -> Option<FetchOutcome> {
        self.outcomes.insert(category, outcome)
    }

    pub fn get(&self, category: Category) -> Option<&FetchOutcome> {
        self.outcomes.get(&category)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &FetchOutcome)> {
        self.outcomes.iter().map(|(c, o)| (*c, o))
    }

    pub fn failures(&self) -> impl Iterator<Item = (Category, &str)> {
        self.outcomes.iter().filter_map(|(c, o)| match o {
            FetchOutcome::Failed(msg) => Some((*c, msg.as_str())),
            FetchOutcome::Records(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
