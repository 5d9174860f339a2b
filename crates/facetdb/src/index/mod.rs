//! Module: index
//! Responsibility: storage of sorted id lists and the placement rule for
//! incremental inserts.
//! Does not own: membership decisions (prefilter semantics live in the
//! engine) or record storage.
//! Boundary: the descending list is authoritative for incremental updates;
//! the ascending list is always written as its exact reverse.

use crate::{
    direction::Direction,
    key,
    model::{FieldModel, Prefilter},
    traits::Record,
    value::Value,
};
use derive_more::Deref;
use std::{cmp::Ordering, collections::HashMap};

///
/// IndexStore
///
/// Encoded index key → ordered id list. Pair writes keep the
/// asc == reverse(desc) invariant; emptied pairs delete their entries.
///

#[derive(Debug, Default, Deref)]
pub struct IndexStore {
    map: HashMap<String, Vec<Value>>,
}

impl IndexStore {
    /// Stored id list for one `(prefilter, field, direction)`, or `None`
    /// when that sub-index does not exist.
    #[must_use]
    pub fn ids(
        &self,
        entity: &str,
        prefilter: &Prefilter,
        dir: Direction,
        field: &str,
    ) -> Option<&Vec<Value>> {
        self.map.get(&key::index_key(entity, prefilter, dir, field))
    }

    /// Owned descending list for incremental maintenance; absent reads as
    /// empty (the newly-seen-partition baseline).
    #[must_use]
    pub fn desc_baseline(&self, entity: &str, prefilter: &Prefilter, field: &str) -> Vec<Value> {
        self.ids(entity, prefilter, Direction::Desc, field)
            .cloned()
            .unwrap_or_default()
    }

    /// Write both directions from the descending list, or delete the pair
    /// when it emptied.
    pub fn write_pair(
        &mut self,
        entity: &str,
        prefilter: &Prefilter,
        field: &str,
        desc: Vec<Value>,
    ) {
        if desc.is_empty() {
            self.delete_pair(entity, prefilter, field);
            return;
        }

        let mut asc = desc.clone();
        asc.reverse();
        self.map
            .insert(key::index_key(entity, prefilter, Direction::Asc, field), asc);
        self.map
            .insert(key::index_key(entity, prefilter, Direction::Desc, field), desc);
    }

    /// Write both directions from a freshly built ascending list (warm /
    /// create_view path).
    pub fn write_pair_from_asc(
        &mut self,
        entity: &str,
        prefilter: &Prefilter,
        field: &str,
        asc: Vec<Value>,
    ) {
        let mut desc = asc.clone();
        desc.reverse();
        self.write_pair(entity, prefilter, field, desc);
    }

    /// Delete both directions of one `(prefilter, field)` pair.
    pub fn delete_pair(&mut self, entity: &str, prefilter: &Prefilter, field: &str) {
        self.map
            .remove(&key::index_key(entity, prefilter, Direction::Asc, field));
        self.map
            .remove(&key::index_key(entity, prefilter, Direction::Desc, field));
    }

    /// True when no entries reference `needle` in their key.
    #[cfg(test)]
    pub(crate) fn no_key_contains(&self, needle: &str) -> bool {
        !self.map.keys().any(|k| k.contains(needle))
    }
}

/// Position at which `value` belongs in a descending list: immediately
/// before the first id whose stored value is strictly smaller. Equal-valued
/// ids are passed over, so later insertions land after their equals.
pub(crate) fn descending_insert_position<R: Record>(
    desc: &[Value],
    records: &HashMap<Value, R>,
    field: &FieldModel,
    value: &Value,
) -> usize {
    desc.iter()
        .position(|id| {
            records
                .get(id)
                .and_then(|record| record.field(&field.name))
                .is_some_and(|stored| field.strategy.compare(&stored, value) == Ordering::Less)
        })
        .unwrap_or(desc.len())
}
