use crate::value::{Value, canonical_cmp};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

///
/// FieldModel
///
/// One configured, sortable field of an entity. The first configured field
/// is the entity's default order for listing and pagination.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldModel {
    pub name: String,
    pub strategy: SortStrategy,
}

impl FieldModel {
    pub fn new(name: impl Into<String>, strategy: SortStrategy) -> Self {
        Self {
            name: name.into(),
            strategy,
        }
    }

    /// Natural-order field shorthand.
    pub fn natural(name: impl Into<String>) -> Self {
        Self::new(name, SortStrategy::Natural)
    }

    /// Chronological field shorthand.
    pub fn datetime(name: impl Into<String>) -> Self {
        Self::new(name, SortStrategy::DateTime)
    }
}

///
/// SortStrategy
///
/// Closed comparator set; dispatch stays a match so sorts inline.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum SortStrategy {
    #[default]
    Natural,
    DateTime,
}

impl SortStrategy {
    /// Compare two field values under this strategy.
    ///
    /// `DateTime` orders timestamps chronologically and ranks them ahead of
    /// any stray non-timestamp payloads so malformed data cannot interleave
    /// with well-typed rows.
    #[must_use]
    pub fn compare(self, left: &Value, right: &Value) -> Ordering {
        match self {
            Self::Natural => canonical_cmp(left, right),
            Self::DateTime => match (left.as_timestamp(), right.as_timestamp()) {
                (Some(a), Some(b)) => a.cmp(b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => canonical_cmp(left, right),
            },
        }
    }
}
