//! Module: uniques
//! Responsibility: distinct-value bookkeeping (`value → count` plus a
//! sorted value list) and its persistence rules.
//! Does not own: which scopes get a bundle; the engine decides that.

use crate::{
    error::{EngineError, ErrorOrigin},
    key,
    model::Prefilter,
    value::{Value, canonical_cmp},
};
use std::{cmp::Ordering, collections::HashMap};

///
/// UniquesBundle
///
/// Working copy of one scope's distinct values. `list` mirrors
/// `sorted(keys(counts))` at all times; the two flags record whether this
/// copy diverged from the stored one and whether a value's final instance
/// went away.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UniquesBundle {
    counts: HashMap<Value, usize>,
    list: Vec<Value>,
    list_changed: bool,
    last_removed: bool,
}

impl UniquesBundle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(counts: HashMap<Value, usize>, list: Vec<Value>) -> Self {
        Self {
            counts,
            list,
            list_changed: false,
            last_removed: false,
        }
    }

    /// Count one occurrence of `value`, inserting it into the sorted list
    /// at the first strictly-greater position when unseen.
    ///
    /// Returns whether the value entered the list for the first time.
    pub fn add(&mut self, value: Value) -> bool {
        if let Some(count) = self.counts.get_mut(&value) {
            *count += 1;
            return false;
        }

        let position = self
            .list
            .iter()
            .position(|existing| canonical_cmp(existing, &value) == Ordering::Greater)
            .unwrap_or(self.list.len());
        self.list.insert(position, value.clone());
        self.counts.insert(value, 1);
        self.list_changed = true;
        true
    }

    /// Uncount one occurrence of `value`.
    ///
    /// Returns whether this removal dropped the value's final instance.
    /// Removing an untracked value is an engine bug.
    pub fn remove(&mut self, value: &Value) -> Result<bool, EngineError> {
        match self.counts.get_mut(value) {
            None => Err(EngineError::invariant(
                ErrorOrigin::Uniques,
                format!("removed value was never counted: {value}"),
            )),
            Some(1) => {
                self.counts.remove(value);
                self.list.retain(|existing| existing != value);
                self.list_changed = true;
                self.last_removed = true;
                Ok(true)
            }
            Some(count) => {
                *count -= 1;
                Ok(false)
            }
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    #[must_use]
    pub fn contains(&self, value: &Value) -> bool {
        self.counts.contains_key(value)
    }

    #[must_use]
    pub const fn counts(&self) -> &HashMap<Value, usize> {
        &self.counts
    }

    #[must_use]
    pub fn list(&self) -> &[Value] {
        &self.list
    }

    #[must_use]
    pub const fn list_changed(&self) -> bool {
        self.list_changed
    }

    #[must_use]
    pub const fn last_removed(&self) -> bool {
        self.last_removed
    }
}

///
/// UniquesStore
///
/// Stored counts maps and sorted lists, keyed by the encoded uniques keys.
///

#[derive(Debug, Default)]
pub struct UniquesStore {
    maps: HashMap<String, HashMap<Value, usize>>,
    lists: HashMap<String, Vec<Value>>,
}

impl UniquesStore {
    /// Fresh working bundle for one scope, flags cleared. Unknown scopes
    /// read as empty.
    #[must_use]
    pub fn get(&self, entity: &str, prefilter: &Prefilter, field: &str) -> UniquesBundle {
        let counts = self
            .maps
            .get(&key::uniques_map_key(entity, prefilter, field))
            .cloned()
            .unwrap_or_default();
        let list = self
            .lists
            .get(&key::uniques_list_key(entity, prefilter, field))
            .cloned()
            .unwrap_or_default();

        UniquesBundle::from_parts(counts, list)
    }

    /// Write a bundle back. Field-partition scopes delete their backing
    /// entries when emptied; global and view scopes persist empty bundles
    /// until destroyed explicitly.
    pub fn persist(&mut self, entity: &str, prefilter: &Prefilter, field: &str, bundle: UniquesBundle) {
        let map_key = key::uniques_map_key(entity, prefilter, field);
        let list_key = key::uniques_list_key(entity, prefilter, field);

        if bundle.is_empty() && matches!(prefilter, Prefilter::Field { .. }) {
            self.maps.remove(&map_key);
            self.lists.remove(&list_key);
            return;
        }

        if bundle.list_changed || !self.lists.contains_key(&list_key) {
            self.lists.insert(list_key, bundle.list);
        }
        self.maps.insert(map_key, bundle.counts);
    }

    /// Delete one scope's entries outright (drop / destroy_view paths).
    pub fn delete(&mut self, entity: &str, prefilter: &Prefilter, field: &str) {
        self.maps
            .remove(&key::uniques_map_key(entity, prefilter, field));
        self.lists
            .remove(&key::uniques_list_key(entity, prefilter, field));
    }

    /// Stored counts snapshot, or empty when the scope is unknown.
    #[must_use]
    pub fn map_snapshot(
        &self,
        entity: &str,
        prefilter: &Prefilter,
        field: &str,
    ) -> HashMap<Value, usize> {
        self.maps
            .get(&key::uniques_map_key(entity, prefilter, field))
            .cloned()
            .unwrap_or_default()
    }

    /// Stored sorted-list snapshot, or empty when the scope is unknown.
    #[must_use]
    pub fn list_snapshot(&self, entity: &str, prefilter: &Prefilter, field: &str) -> Vec<Value> {
        self.lists
            .get(&key::uniques_list_key(entity, prefilter, field))
            .cloned()
            .unwrap_or_default()
    }

    /// True when no entries reference `needle` in their key.
    #[cfg(test)]
    pub(crate) fn no_key_contains(&self, needle: &str) -> bool {
        !self.maps.keys().any(|k| k.contains(needle))
            && !self.lists.keys().any(|k| k.contains(needle))
    }
}
