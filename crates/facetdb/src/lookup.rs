use crate::{key, value::Value};
use derive_more::Deref;
use std::collections::HashMap;

///
/// LookupStore
///
/// Reverse maps from a field value to the ids carrying it, keyed by the
/// encoded lookup key. Id order within a list is insertion order; only
/// membership is contractual.
///

#[derive(Debug, Default, Deref)]
pub struct LookupStore {
    map: HashMap<String, HashMap<Value, Vec<Value>>>,
}

impl LookupStore {
    /// Append `id` under `value` for one `(entity, field)` lookup.
    pub fn add(&mut self, entity: &str, field: &str, value: Value, id: Value) {
        self.map
            .entry(key::lookup_key(entity, field))
            .or_default()
            .entry(value)
            .or_default()
            .push(id);
    }

    /// Remove `id` from under `value`, dropping the value's entry when its
    /// last id goes away.
    pub fn remove(&mut self, entity: &str, field: &str, value: &Value, id: &Value) {
        let Some(lookup) = self.map.get_mut(&key::lookup_key(entity, field)) else {
            return;
        };
        let Some(ids) = lookup.get_mut(value) else {
            return;
        };

        ids.retain(|existing| existing != id);
        if ids.is_empty() {
            lookup.remove(value);
        }
    }

    /// Ids stored under `value`, or empty when unseen.
    #[must_use]
    pub fn ids_for(&self, entity: &str, field: &str, value: &Value) -> Vec<Value> {
        self.map
            .get(&key::lookup_key(entity, field))
            .and_then(|lookup| lookup.get(value))
            .cloned()
            .unwrap_or_default()
    }

    /// Whole-map snapshot for one `(entity, field)` lookup.
    #[must_use]
    pub fn snapshot(&self, entity: &str, field: &str) -> HashMap<Value, Vec<Value>> {
        self.map
            .get(&key::lookup_key(entity, field))
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::LookupStore;
    use crate::value::Value;

    #[test]
    fn add_then_remove_round_trips_membership() {
        let mut store = LookupStore::default();
        store.add("albums", "artist", Value::text("Logistics"), Value::Uint(1));
        store.add("albums", "artist", Value::text("Logistics"), Value::Uint(2));

        assert_eq!(
            store.ids_for("albums", "artist", &Value::text("Logistics")),
            vec![Value::Uint(1), Value::Uint(2)]
        );

        store.remove("albums", "artist", &Value::text("Logistics"), &Value::Uint(1));
        assert_eq!(
            store.ids_for("albums", "artist", &Value::text("Logistics")),
            vec![Value::Uint(2)]
        );
    }

    #[test]
    fn last_id_removal_drops_the_value_entry() {
        let mut store = LookupStore::default();
        store.add("albums", "artist", Value::text("Bop"), Value::Uint(9));
        store.remove("albums", "artist", &Value::text("Bop"), &Value::Uint(9));

        assert!(store.snapshot("albums", "artist").is_empty());
        assert!(store.ids_for("albums", "artist", &Value::text("Bop")).is_empty());
    }

    #[test]
    fn unseen_lookups_read_as_empty() {
        let store = LookupStore::default();
        assert!(store.ids_for("albums", "artist", &Value::text("x")).is_empty());
        assert!(store.snapshot("albums", "artist").is_empty());
    }
}
