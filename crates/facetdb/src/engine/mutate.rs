//! Module: engine::mutate
//! Responsibility: the put/remove core — every derived structure is
//! updated from one record transition `(prev, new)`.
//! Boundary: records are prevalidated before any state is touched, so the
//! update path itself cannot fail on well-typed data.

use crate::{
    engine::{Engine, required_field},
    error::EngineError,
    index::descending_insert_position,
    model::{EntityModel, FieldModel, Prefilter},
    pubsub::UniquesChange,
    traits::Record,
    uniques::UniquesBundle,
    value::Value,
};
use tracing::trace;

impl<R: Record> Engine<R> {
    /// Insert or update one record, keeping every index, uniques bundle,
    /// view, and lookup consistent. A put of an identical record is a no-op.
    pub fn put(&mut self, entity: &str, record: R) -> Result<(), EngineError> {
        let model = self.model(entity)?.clone();
        model.validate_record(&record)?;
        let id = model.id_of(&record)?;

        let state = self.state_mut(entity)?;
        let prev = state.records.get(&id).cloned();
        if prev.as_ref() == Some(&record) {
            return Ok(());
        }

        trace!(entity = %entity, id = %id, update = prev.is_some(), "put");
        state.records.insert(id.clone(), record.clone());
        self.apply(&model, &id, prev.as_ref(), Some(&record))
    }

    /// Remove one record by id, unwinding it from every derived structure.
    pub fn remove(&mut self, entity: &str, id: &Value) -> Result<(), EngineError> {
        let model = self.model(entity)?.clone();
        let prev = self
            .state(entity)?
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::record_not_found(entity))?;

        trace!(entity = %entity, id = %id, "remove");
        self.apply(&model, id, Some(&prev), None)?;
        self.state_mut(entity)?.records.remove(id);

        Ok(())
    }

    // One record transition applied to every dependent structure:
    // prefilter scopes first, then registered views, then lookups.
    fn apply(
        &mut self,
        model: &EntityModel<R>,
        id: &Value,
        prev: Option<&R>,
        new: Option<&R>,
    ) -> Result<(), EngineError> {
        for pf in model.normalized_prefilters() {
            match &pf.field {
                None => {
                    for field in &model.fields {
                        self.update_index_for_field(
                            model,
                            id,
                            prev,
                            new,
                            &Prefilter::Global,
                            field,
                        )?;
                    }
                    for unique_field in &pf.maintain_unique {
                        self.update_uniques(model, prev, new, &Prefilter::Global, unique_field)?;
                    }
                }
                Some(pf_key) => {
                    self.apply_partitioned(model, id, prev, new, pf_key, &pf.maintain_unique)?;
                }
            }
        }

        self.apply_views(model, id, prev, new)?;

        for lookup_field in &model.lookups {
            self.update_lookup(&model.name, lookup_field, id, prev, new);
        }

        Ok(())
    }

    // One value-partitioned prefilter scope: every known partition gets the
    // transition, a never-seen new value opens a partition against empty
    // baselines, and a partition losing its last record is pruned whole.
    fn apply_partitioned(
        &mut self,
        model: &EntityModel<R>,
        id: &Value,
        prev: Option<&R>,
        new: Option<&R>,
        pf_key: &str,
        maintain_unique: &[String],
    ) -> Result<(), EngineError> {
        let entity = model.name.clone();

        let mut bundle = self.uniques.get(&entity, &Prefilter::Global, pf_key);
        let known: Vec<Value> = bundle.list().to_vec();

        let prev_value = match prev {
            Some(record) => Some(required_field(&entity, record, pf_key)?),
            None => None,
        };
        let new_value = match new {
            Some(record) => Some(required_field(&entity, record, pf_key)?),
            None => None,
        };
        let newly_seen = new_value
            .as_ref()
            .is_some_and(|value| !bundle.contains(value));

        let mut pruned: Vec<Value> = Vec::new();
        for value in &known {
            let removed_last = update_global_uniques_for_pf(
                &mut bundle,
                prev_value.as_ref(),
                new_value.as_ref(),
                value,
            )?;

            let prefilter = Prefilter::Field {
                field: pf_key.to_string(),
                value: value.clone(),
            };
            for field in &model.fields {
                self.update_index_for_field(model, id, prev, new, &prefilter, field)?;
            }
            for unique_field in maintain_unique {
                self.update_uniques(model, prev, new, &prefilter, unique_field)?;
            }

            if removed_last {
                pruned.push(value.clone());
            }
        }

        if newly_seen && let Some(value) = &new_value {
            bundle.add(value.clone());

            let prefilter = Prefilter::Field {
                field: pf_key.to_string(),
                value: value.clone(),
            };
            for field in &model.fields {
                self.update_index_for_field(model, id, prev, new, &prefilter, field)?;
            }
            for unique_field in maintain_unique {
                self.update_uniques(model, prev, new, &prefilter, unique_field)?;
            }
        }

        self.uniques
            .persist(&entity, &Prefilter::Global, pf_key, bundle);

        for value in pruned {
            self.prune_partition(model, pf_key, &value, maintain_unique);
        }

        Ok(())
    }

    // Delete an emptied partition's whole quadrant: every sorted pair and
    // every maintained uniques scope under `(pf_key, value)`.
    fn prune_partition(
        &mut self,
        model: &EntityModel<R>,
        pf_key: &str,
        value: &Value,
        maintain_unique: &[String],
    ) {
        let prefilter = Prefilter::Field {
            field: pf_key.to_string(),
            value: value.clone(),
        };

        for field in &model.fields {
            self.indexes
                .delete_pair(&model.name, &prefilter, &field.name);
        }
        for unique_field in maintain_unique {
            self.uniques.delete(&model.name, &prefilter, unique_field);
        }
    }

    // The membership-flag matrix for one `(prefilter, field)` sorted pair.
    pub(crate) fn update_index_for_field(
        &mut self,
        model: &EntityModel<R>,
        id: &Value,
        prev: Option<&R>,
        new: Option<&R>,
        prefilter: &Prefilter,
        field: &FieldModel,
    ) -> Result<(), EngineError> {
        let entity = model.name.as_str();
        let prev_in = prev.filter(|record| self.under_prefilter(entity, record, prefilter));
        let new_in = new.filter(|record| self.under_prefilter(entity, record, prefilter));

        match (prev_in, new_in) {
            (Some(prev_record), Some(new_record)) => {
                let prev_value = required_field(entity, prev_record, &field.name)?;
                let new_value = required_field(entity, new_record, &field.name)?;
                if prev_value == new_value {
                    return Ok(());
                }

                let mut desc = self.indexes.desc_baseline(entity, prefilter, &field.name);
                desc.retain(|existing| existing != id);
                self.insert_sorted(entity, prefilter, field, desc, id, &new_value)?;
            }
            (Some(_), None) => {
                let mut desc = self.indexes.desc_baseline(entity, prefilter, &field.name);
                desc.retain(|existing| existing != id);
                self.indexes.write_pair(entity, prefilter, &field.name, desc);
            }
            (None, Some(new_record)) => {
                let new_value = required_field(entity, new_record, &field.name)?;
                let desc = self.indexes.desc_baseline(entity, prefilter, &field.name);
                self.insert_sorted(entity, prefilter, field, desc, id, &new_value)?;
            }
            (None, None) => {}
        }

        Ok(())
    }

    fn insert_sorted(
        &mut self,
        entity: &str,
        prefilter: &Prefilter,
        field: &FieldModel,
        mut desc: Vec<Value>,
        id: &Value,
        value: &Value,
    ) -> Result<(), EngineError> {
        let records = &self.state(entity)?.records;
        let position = descending_insert_position(&desc, records, field, value);
        desc.insert(position, id.clone());
        self.indexes.write_pair(entity, prefilter, &field.name, desc);

        Ok(())
    }

    // Membership-flag maintenance of one uniques scope. Returns the
    // list-level changes (first appearance / final disappearance) so the
    // view path can batch them into one event.
    pub(crate) fn update_uniques(
        &mut self,
        model: &EntityModel<R>,
        prev: Option<&R>,
        new: Option<&R>,
        prefilter: &Prefilter,
        field: &str,
    ) -> Result<Vec<UniquesChange>, EngineError> {
        let entity = model.name.as_str();
        let prev_in = prev.filter(|record| self.under_prefilter(entity, record, prefilter));
        let new_in = new.filter(|record| self.under_prefilter(entity, record, prefilter));

        let mut events = Vec::new();
        match (prev_in, new_in) {
            (None, None) => {}
            (Some(prev_record), Some(new_record)) => {
                let prev_value = required_field(entity, prev_record, field)?;
                let new_value = required_field(entity, new_record, field)?;
                if prev_value == new_value {
                    return Ok(events);
                }

                let mut bundle = self.uniques.get(entity, prefilter, field);
                if bundle.remove(&prev_value)? {
                    events.push(UniquesChange::Remove(prev_value));
                }
                if bundle.add(new_value.clone()) {
                    events.push(UniquesChange::Add(new_value));
                }
                self.uniques.persist(entity, prefilter, field, bundle);
            }
            (Some(prev_record), None) => {
                let prev_value = required_field(entity, prev_record, field)?;
                let mut bundle = self.uniques.get(entity, prefilter, field);
                if bundle.remove(&prev_value)? {
                    events.push(UniquesChange::Remove(prev_value));
                }
                self.uniques.persist(entity, prefilter, field, bundle);
            }
            (None, Some(new_record)) => {
                let new_value = required_field(entity, new_record, field)?;
                let mut bundle = self.uniques.get(entity, prefilter, field);
                if bundle.add(new_value.clone()) {
                    events.push(UniquesChange::Add(new_value));
                }
                self.uniques.persist(entity, prefilter, field, bundle);
            }
        }

        Ok(events)
    }

    // Reverse-lookup maintenance for one field.
    fn update_lookup(
        &mut self,
        entity: &str,
        field: &str,
        id: &Value,
        prev: Option<&R>,
        new: Option<&R>,
    ) {
        let prev_value = prev.and_then(|record| record.field(field));
        let new_value = new.and_then(|record| record.field(field));

        match (prev_value, new_value) {
            (None, Some(value)) => self.lookups.add(entity, field, value, id.clone()),
            (Some(value), None) => self.lookups.remove(entity, field, &value, id),
            (Some(prev_value), Some(new_value)) => {
                if prev_value != new_value {
                    self.lookups.remove(entity, field, &prev_value, id);
                    self.lookups.add(entity, field, new_value, id.clone());
                }
            }
            (None, None) => {}
        }
    }
}

// One known partition value's share of a global prefilter bundle update:
// the record's old value is uncounted, the new value counted, and a `true`
// return means `value`'s final instance just went away.
fn update_global_uniques_for_pf(
    bundle: &mut UniquesBundle,
    prev_value: Option<&Value>,
    new_value: Option<&Value>,
    value: &Value,
) -> Result<bool, EngineError> {
    if prev_value.is_some() && prev_value == new_value {
        return Ok(false);
    }

    let mut removed_last = false;
    if prev_value == Some(value) {
        removed_last = bundle.remove(value)?;
    }
    if new_value == Some(value) {
        bundle.add(value.clone());
    }

    Ok(removed_last)
}
