//! Module: engine
//! Responsibility: entity state ownership and the coordination of every
//! derived structure under warm, put, remove, and the view lifecycle.
//! Does not own: transport (pub/sub is injected) or cursor paging math.

mod mutate;
mod view;
mod warm;


use crate::{
    direction::Direction,
    error::EngineError,
    index::IndexStore,
    lookup::LookupStore,
    model::{EntityModel, Prefilter},
    pubsub::Broadcaster,
    traits::Record,
    uniques::UniquesStore,
    value::Value,
    view::ViewSpec,
};
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

// re-exports
pub use warm::{EntityData, OrderHint, WarmEntry};

///
/// EntityState
///
/// Everything owned per entity: the immutable model, the primary store,
/// and the registered views. Derived id lists, uniques, and lookups live
/// in the engine-level stores under encoded keys.
///

#[derive(Debug)]
pub(crate) struct EntityState<R: Record> {
    pub(crate) model: EntityModel<R>,
    pub(crate) records: HashMap<Value, R>,
    pub(crate) views: BTreeMap<String, ViewSpec<R>>,
}

///
/// Engine
///
/// Single-owner, in-memory multi-index store. Mutations take `&mut self`
/// and are observable atomically; reads take `&self` and return owned
/// snapshots.
///

pub struct Engine<R: Record> {
    pub(crate) entities: BTreeMap<String, EntityState<R>>,
    pub(crate) indexes: IndexStore,
    pub(crate) uniques: UniquesStore,
    pub(crate) lookups: LookupStore,
    pub(crate) broadcaster: Option<Arc<dyn Broadcaster<R>>>,
}

impl<R: Record + std::fmt::Debug> std::fmt::Debug for Engine<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("entities", &self.entities)
            .field("indexes", &self.indexes)
            .field("uniques", &self.uniques)
            .field("lookups", &self.lookups)
            .field("broadcaster", &self.broadcaster.as_ref().map(|_| "<broadcaster>"))
            .finish()
    }
}

impl<R: Record> Engine<R> {
    /// Attach a pub/sub sink; view transitions publish to fingerprint topics.
    #[must_use]
    pub fn with_broadcaster(mut self, broadcaster: Arc<dyn Broadcaster<R>>) -> Self {
        self.broadcaster = Some(broadcaster);
        self
    }

    pub(crate) fn state(&self, entity: &str) -> Result<&EntityState<R>, EngineError> {
        self.entities
            .get(entity)
            .ok_or_else(|| EngineError::entity_not_found(entity))
    }

    pub(crate) fn state_mut(&mut self, entity: &str) -> Result<&mut EntityState<R>, EngineError> {
        self.entities
            .get_mut(entity)
            .ok_or_else(|| EngineError::entity_not_found(entity))
    }

    pub(crate) fn model(&self, entity: &str) -> Result<&EntityModel<R>, EngineError> {
        self.state(entity).map(|state| &state.model)
    }

    ///
    /// MEMBERSHIP
    ///

    /// Whether `record` belongs under `prefilter`. View prefilters resolve
    /// through the registry and combine the base prefilter with the view's
    /// predicate.
    pub(crate) fn under_prefilter(&self, entity: &str, record: &R, prefilter: &Prefilter) -> bool {
        match prefilter {
            Prefilter::Global => true,
            Prefilter::Field { field, value } => record.field(field).as_ref() == Some(value),
            Prefilter::View { fingerprint } => self
                .entities
                .get(entity)
                .and_then(|state| state.views.get(fingerprint))
                .is_some_and(|spec| self.view_contains(entity, spec, record)),
        }
    }

    pub(crate) fn view_contains(&self, entity: &str, spec: &ViewSpec<R>, record: &R) -> bool {
        self.under_prefilter(entity, record, &spec.prefilter) && spec.predicate_matches(record)
    }

    ///
    /// READS
    ///

    /// One record by id, or `None`.
    pub fn get(&self, entity: &str, id: &Value) -> Result<Option<R>, EngineError> {
        Ok(self.state(entity)?.records.get(id).cloned())
    }

    /// Raw sorted id list for `(prefilter, order_hint)`; absent sub-indexes
    /// read as empty.
    pub fn get_index(
        &self,
        entity: &str,
        prefilter: &Prefilter,
        order_hint: Option<(&str, Direction)>,
    ) -> Result<Vec<Value>, EngineError> {
        let model = self.model(entity)?;
        let (field, direction) = match order_hint {
            Some((field, direction)) => (field.to_string(), direction),
            None => (model.first_field()?.name.clone(), Direction::Asc),
        };

        Ok(self
            .indexes
            .ids(entity, prefilter, direction, &field)
            .cloned()
            .unwrap_or_default())
    }

    /// Record snapshots under `(prefilter, order_hint)`, defaulting to the
    /// first configured field ascending.
    pub fn get_records(
        &self,
        entity: &str,
        prefilter: &Prefilter,
        order_hint: Option<(&str, Direction)>,
    ) -> Result<Vec<R>, EngineError> {
        let ids = self.get_index(entity, prefilter, order_hint)?;
        let records = &self.state(entity)?.records;

        Ok(ids
            .iter()
            .filter_map(|id| records.get(id).cloned())
            .collect())
    }

    /// Records carrying `value` in a configured lookup field.
    pub fn get_by(&self, entity: &str, field: &str, value: &Value) -> Result<Vec<R>, EngineError> {
        let ids = self.lookups.ids_for(entity, field, value);
        let records = &self.state(entity)?.records;

        Ok(ids
            .iter()
            .filter_map(|id| records.get(id).cloned())
            .collect())
    }

    /// Whole reverse map for one lookup field.
    pub fn get_lookup(
        &self,
        entity: &str,
        field: &str,
    ) -> Result<HashMap<Value, Vec<Value>>, EngineError> {
        self.state(entity)?;
        Ok(self.lookups.snapshot(entity, field))
    }

    /// Distinct values with occurrence counts for one scope, or empty.
    pub fn get_uniques_map(
        &self,
        entity: &str,
        prefilter: &Prefilter,
        field: &str,
    ) -> Result<HashMap<Value, usize>, EngineError> {
        self.state(entity)?;
        Ok(self.uniques.map_snapshot(entity, prefilter, field))
    }

    /// Sorted distinct values for one scope, or empty.
    pub fn get_uniques_list(
        &self,
        entity: &str,
        prefilter: &Prefilter,
        field: &str,
    ) -> Result<Vec<Value>, EngineError> {
        self.state(entity)?;
        Ok(self.uniques.list_snapshot(entity, prefilter, field))
    }

    /// One registered view spec, or `None`.
    pub fn get_view(
        &self,
        entity: &str,
        fingerprint: &str,
    ) -> Result<Option<ViewSpec<R>>, EngineError> {
        Ok(self.state(entity)?.views.get(fingerprint).cloned())
    }

    /// All registered views of one entity.
    pub fn get_views(&self, entity: &str) -> Result<BTreeMap<String, ViewSpec<R>>, EngineError> {
        Ok(self.state(entity)?.views.clone())
    }
}

/// Field read that every configured field is entitled to; absence past
/// prevalidation is an engine bug surfaced as `MissingField`.
pub(crate) fn required_field<R: Record>(
    entity: &str,
    record: &R,
    field: &str,
) -> Result<Value, EngineError> {
    record
        .field(field)
        .ok_or_else(|| EngineError::missing_field(entity, field))
}
