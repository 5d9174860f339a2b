use crate::{
    direction::Direction,
    engine::{Engine, EntityState, required_field},
    error::EngineError,
    model::{ConfigError, EntityModel, FieldModel, Prefilter},
    traits::Record,
    uniques::UniquesBundle,
    value::Value,
};
use std::collections::{BTreeMap, HashMap};
use tracing::info;

///
/// OrderHint
///
/// Caller's promise that warm data already arrives ordered by one field.
/// A matching hint skips the sort for that field; the opposite direction is
/// the exact reverse.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OrderHint {
    pub field: String,
    pub direction: Direction,
}

impl OrderHint {
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    fn matches(&self, field: &str) -> Option<Direction> {
        (self.field == field).then_some(self.direction)
    }
}

///
/// EntityData
///
/// Warm-time payload for one entity.
///

#[derive(Clone, Debug, Default)]
pub struct EntityData<R> {
    pub records: Vec<R>,
    pub hint: Option<OrderHint>,
}

impl<R> EntityData<R> {
    pub fn new(records: Vec<R>) -> Self {
        Self {
            records,
            hint: None,
        }
    }

    #[must_use]
    pub fn with_hint(mut self, hint: OrderHint) -> Self {
        self.hint = Some(hint);
        self
    }
}

///
/// WarmEntry
///

#[derive(Clone, Debug)]
pub struct WarmEntry<R: Record> {
    pub model: EntityModel<R>,
    pub data: EntityData<R>,
}

impl<R: Record> WarmEntry<R> {
    pub const fn new(model: EntityModel<R>, data: EntityData<R>) -> Self {
        Self { model, data }
    }
}

impl<R: Record> Engine<R> {
    /// Build an engine from per-entity configuration and bulk data,
    /// materializing every derived structure up front.
    pub fn warm(entries: Vec<WarmEntry<R>>) -> Result<Self, EngineError> {
        let mut engine = Self {
            entities: BTreeMap::new(),
            indexes: crate::index::IndexStore::default(),
            uniques: crate::uniques::UniquesStore::default(),
            lookups: crate::lookup::LookupStore::default(),
            broadcaster: None,
        };

        for entry in entries {
            engine.warm_entity(entry)?;
        }

        Ok(engine)
    }

    fn warm_entity(&mut self, entry: WarmEntry<R>) -> Result<(), EngineError> {
        let WarmEntry { model, data } = entry;
        let entity = model.name.clone();

        model.validate()?;
        if let Some(hint) = &data.hint
            && model.field_model(&hint.field).is_none()
        {
            return Err(ConfigError::UnknownHintField {
                entity: entity.clone(),
                field: hint.field.clone(),
            }
            .into());
        }

        // Primary store, preserving warm input order for the id list.
        let mut records: HashMap<Value, R> = HashMap::with_capacity(data.records.len());
        let mut ids: Vec<Value> = Vec::with_capacity(data.records.len());
        for record in data.records {
            model.validate_record(&record)?;
            let id = model.id_of(&record)?;
            ids.push(id.clone());
            records.insert(id, record);
        }

        // Global sorted pairs, one per configured field.
        for field in &model.fields {
            self.warm_index_pair(
                &entity,
                &Prefilter::Global,
                field,
                &ids,
                &records,
                data.hint.as_ref(),
            )?;
        }

        for pf in model.normalized_prefilters() {
            match &pf.field {
                None => {
                    for unique_field in &pf.maintain_unique {
                        let bundle =
                            fold_bundle(&entity, &ids, &records, unique_field)?;
                        self.uniques
                            .persist(&entity, &Prefilter::Global, unique_field, bundle);
                    }
                }
                Some(pf_key) => {
                    // The global bundle over the prefilter field is how
                    // callers discover which partitions exist.
                    let bundle = fold_bundle(&entity, &ids, &records, pf_key)?;
                    self.uniques
                        .persist(&entity, &Prefilter::Global, pf_key, bundle);

                    for (value, group_ids) in group_by_field(&entity, &ids, &records, pf_key)? {
                        let prefilter = Prefilter::Field {
                            field: pf_key.clone(),
                            value,
                        };

                        for field in &model.fields {
                            self.warm_index_pair(
                                &entity,
                                &prefilter,
                                field,
                                &group_ids,
                                &records,
                                data.hint.as_ref(),
                            )?;
                        }

                        for unique_field in &pf.maintain_unique {
                            let bundle =
                                fold_bundle(&entity, &group_ids, &records, unique_field)?;
                            self.uniques
                                .persist(&entity, &prefilter, unique_field, bundle);
                        }
                    }
                }
            }
        }

        for lookup_field in &model.lookups {
            for id in &ids {
                if let Some(record) = records.get(id) {
                    let value = required_field(&entity, record, lookup_field)?;
                    self.lookups
                        .add(&entity, lookup_field, value, id.clone());
                }
            }
        }

        info!(entity = %entity, records = ids.len(), "warmed entity");

        self.entities.insert(
            entity,
            EntityState {
                model,
                records,
                views: BTreeMap::new(),
            },
        );

        Ok(())
    }

    // One asc/desc pair from warm input order: a matching hint direction is
    // taken as-is (a subsequence of hinted input stays ordered), anything
    // else gets a stable sort.
    fn warm_index_pair(
        &mut self,
        entity: &str,
        prefilter: &Prefilter,
        field: &FieldModel,
        ids: &[Value],
        records: &HashMap<Value, R>,
        hint: Option<&OrderHint>,
    ) -> Result<(), EngineError> {
        match hint.and_then(|h| h.matches(&field.name)) {
            Some(Direction::Asc) => {
                self.indexes
                    .write_pair_from_asc(entity, prefilter, &field.name, ids.to_vec());
            }
            Some(Direction::Desc) => {
                self.indexes
                    .write_pair(entity, prefilter, &field.name, ids.to_vec());
            }
            None => {
                let asc = sort_ids_by_field(entity, ids, records, field)?;
                self.indexes
                    .write_pair_from_asc(entity, prefilter, &field.name, asc);
            }
        }

        Ok(())
    }
}

// Stable ascending sort of `ids` by one field's strategy.
fn sort_ids_by_field<R: Record>(
    entity: &str,
    ids: &[Value],
    records: &HashMap<Value, R>,
    field: &FieldModel,
) -> Result<Vec<Value>, EngineError> {
    let mut keyed: Vec<(Value, Value)> = Vec::with_capacity(ids.len());
    for id in ids {
        let record = records
            .get(id)
            .ok_or_else(|| EngineError::missing_field(entity, &field.name))?;
        keyed.push((required_field(entity, record, &field.name)?, id.clone()));
    }

    keyed.sort_by(|(left, _), (right, _)| field.strategy.compare(left, right));
    Ok(keyed.into_iter().map(|(_, id)| id).collect())
}

// Partition ids by one field's value, preserving input order per group.
fn group_by_field<R: Record>(
    entity: &str,
    ids: &[Value],
    records: &HashMap<Value, R>,
    field: &str,
) -> Result<Vec<(Value, Vec<Value>)>, EngineError> {
    let mut order: Vec<Value> = Vec::new();
    let mut groups: HashMap<Value, Vec<Value>> = HashMap::new();

    for id in ids {
        let Some(record) = records.get(id) else {
            continue;
        };
        let value = required_field(entity, record, field)?;
        if !groups.contains_key(&value) {
            order.push(value.clone());
        }
        groups.entry(value).or_default().push(id.clone());
    }

    Ok(order
        .into_iter()
        .filter_map(|value| {
            let ids = groups.remove(&value)?;
            Some((value, ids))
        })
        .collect())
}

// Fold one uniques bundle over `ids` in order.
fn fold_bundle<R: Record>(
    entity: &str,
    ids: &[Value],
    records: &HashMap<Value, R>,
    field: &str,
) -> Result<UniquesBundle, EngineError> {
    let mut bundle = UniquesBundle::new();
    for id in ids {
        if let Some(record) = records.get(id) {
            bundle.add(required_field(entity, record, field)?);
        }
    }

    Ok(bundle)
}
