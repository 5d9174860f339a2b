//! Module: engine::view
//! Responsibility: view lifecycle (create/destroy) and the view share of
//! every mutation, including delta publication.

use crate::{
    direction::Direction,
    engine::{Engine, required_field},
    error::EngineError,
    model::{EntityModel, Prefilter},
    pubsub::{UniquesChange, ViewEvent},
    traits::Record,
    uniques::UniquesBundle,
    value::Value,
    view::ViewSpec,
};
use tracing::debug;

impl<R: Record> Engine<R> {
    /// Materialize and register a view under `fingerprint`.
    ///
    /// All derived lists and bundles are written before the view spec
    /// becomes visible in the registry.
    pub fn create_view(
        &mut self,
        entity: &str,
        fingerprint: &str,
        spec: ViewSpec<R>,
    ) -> Result<ViewSpec<R>, EngineError> {
        let model = self.model(entity)?.clone();
        if self.state(entity)?.views.contains_key(fingerprint) {
            return Err(EngineError::view_duplicate(entity, fingerprint));
        }

        // Baseline comes from the first field's pair: it is already
        // materialized for every prefilter the engine maintains.
        let first_field = model.first_field()?.clone();
        let baseline = self
            .indexes
            .ids(entity, &spec.prefilter, Direction::Asc, &first_field.name)
            .cloned()
            .unwrap_or_default();

        let state = self.state(entity)?;
        let surviving: Vec<Value> = baseline
            .into_iter()
            .filter(|id| {
                state
                    .records
                    .get(id)
                    .is_some_and(|record| spec.predicate_matches(record))
            })
            .collect();

        let view_pf = Prefilter::view(fingerprint);
        for field in &model.fields {
            let asc = if field.name == first_field.name {
                // the filtered baseline is already in this field's order
                surviving.clone()
            } else {
                let records = &self.state(entity)?.records;
                let mut keyed: Vec<(Value, Value)> = Vec::with_capacity(surviving.len());
                for id in &surviving {
                    let Some(record) = records.get(id) else {
                        continue;
                    };
                    keyed.push((required_field(entity, record, &field.name)?, id.clone()));
                }
                keyed.sort_by(|(left, _), (right, _)| field.strategy.compare(left, right));
                keyed.into_iter().map(|(_, id)| id).collect()
            };

            self.indexes
                .write_pair_from_asc(entity, &view_pf, &field.name, asc);
        }

        for unique_field in &spec.maintain_unique {
            let records = &self.state(entity)?.records;
            let mut bundle = UniquesBundle::new();
            for id in &surviving {
                if let Some(record) = records.get(id) {
                    bundle.add(required_field(entity, record, unique_field)?);
                }
            }
            self.uniques
                .persist(entity, &view_pf, unique_field, bundle);
        }

        debug!(entity = %entity, fingerprint = %fingerprint, records = surviving.len(), "created view");

        self.state_mut(entity)?
            .views
            .insert(fingerprint.to_string(), spec.clone());

        Ok(spec)
    }

    /// Unregister a view and delete every fingerprint-scoped entry.
    ///
    /// The view spec leaves the registry first, so readers that miss it see
    /// no derived entries either.
    pub fn destroy_view(&mut self, entity: &str, fingerprint: &str) -> Result<(), EngineError> {
        let model = self.model(entity)?.clone();
        let spec = self
            .state_mut(entity)?
            .views
            .remove(fingerprint)
            .ok_or_else(|| EngineError::view_not_found(entity, fingerprint))?;

        let view_pf = Prefilter::view(fingerprint);
        for field in &model.fields {
            self.indexes.delete_pair(entity, &view_pf, &field.name);
        }
        for unique_field in &spec.maintain_unique {
            self.uniques.delete(entity, &view_pf, unique_field);
        }

        debug!(entity = %entity, fingerprint = %fingerprint, "destroyed view");

        Ok(())
    }

    // The view share of one mutation: per-view index and uniques updates,
    // plus delta publication when a sink is configured.
    pub(crate) fn apply_views(
        &mut self,
        model: &EntityModel<R>,
        id: &Value,
        prev: Option<&R>,
        new: Option<&R>,
    ) -> Result<(), EngineError> {
        let entity = model.name.as_str();
        let specs: Vec<(String, ViewSpec<R>)> = self
            .state(entity)?
            .views
            .iter()
            .map(|(fingerprint, spec)| (fingerprint.clone(), spec.clone()))
            .collect();

        for (fingerprint, spec) in specs {
            let prev_in = prev.is_some_and(|record| self.view_contains(entity, &spec, record));
            let new_in = new.is_some_and(|record| self.view_contains(entity, &spec, record));

            let prefilter = Prefilter::view(&fingerprint);
            for field in &model.fields {
                self.update_index_for_field(model, id, prev, new, &prefilter, field)?;
            }

            let mut uniques_changes: Vec<(String, Vec<UniquesChange>)> = Vec::new();
            for unique_field in &spec.maintain_unique {
                let changes = self.update_uniques(model, prev, new, &prefilter, unique_field)?;
                if !changes.is_empty() {
                    uniques_changes.push((unique_field.clone(), changes));
                }
            }

            self.publish_view_deltas(
                model,
                &fingerprint,
                id,
                prev,
                new,
                prev_in,
                new_in,
                uniques_changes,
            );
        }

        Ok(())
    }

    #[expect(clippy::too_many_arguments)]
    fn publish_view_deltas(
        &self,
        model: &EntityModel<R>,
        fingerprint: &str,
        id: &Value,
        prev: Option<&R>,
        new: Option<&R>,
        prev_in: bool,
        new_in: bool,
        uniques_changes: Vec<(String, Vec<UniquesChange>)>,
    ) {
        let Some(broadcaster) = &self.broadcaster else {
            return;
        };

        let event = match (prev_in, new_in, new) {
            (false, true, Some(record)) => Some(ViewEvent::Added {
                fingerprint: fingerprint.to_string(),
                record: record.clone(),
            }),
            (true, false, _) => Some(ViewEvent::Removed {
                fingerprint: fingerprint.to_string(),
                id: id.clone(),
            }),
            (true, true, Some(record)) => {
                // update events track field transitions only; a record whose
                // configured fields all kept their values stays silent
                let field_changed = prev.is_some_and(|prev_record| {
                    model.fields.iter().any(|field| {
                        prev_record.field(&field.name) != record.field(&field.name)
                    })
                });
                field_changed.then(|| ViewEvent::Updated {
                    fingerprint: fingerprint.to_string(),
                    record: record.clone(),
                })
            }
            _ => None,
        };

        if let Some(event) = event {
            broadcaster.publish(fingerprint, event);
        }

        for (field, events) in uniques_changes {
            broadcaster.publish(
                fingerprint,
                ViewEvent::Uniques {
                    fingerprint: fingerprint.to_string(),
                    field,
                    events,
                },
            );
        }
    }
}
