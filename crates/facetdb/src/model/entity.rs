use crate::{
    error::{EngineError, ErrorOrigin},
    model::{ConfigError, field::FieldModel, prefilter::PrefilterModel},
    traits::Record,
    value::Value,
};

///
/// IdKey
///
/// How a record id is obtained: read a named field, or derive it with a
/// pure function of the record.
///

#[derive(Clone, Debug)]
pub enum IdKey<R> {
    Field(String),
    Extract(fn(&R) -> Value),
}

impl<R: Record> IdKey<R> {
    /// Extract the id for `record`, failing when the id field is absent.
    pub fn id_of(&self, entity: &str, record: &R) -> Result<Value, EngineError> {
        match self {
            Self::Field(name) => record
                .field(name)
                .ok_or_else(|| EngineError::missing_field(entity, name)),
            Self::Extract(f) => Ok(f(record)),
        }
    }

    /// The backing field name, when the id is a plain field read.
    #[must_use]
    pub fn field_name(&self) -> Option<&str> {
        match self {
            Self::Field(name) => Some(name),
            Self::Extract(_) => None,
        }
    }
}

///
/// EntityModel
///
/// Immutable configuration for one entity: identity, sortable fields,
/// prefilter scopes, and reverse-lookup fields. Created once at warm time.
///

#[derive(Clone, Debug)]
pub struct EntityModel<R> {
    pub name: String,
    pub id_key: IdKey<R>,
    pub fields: Vec<FieldModel>,
    pub prefilters: Vec<PrefilterModel>,
    pub lookups: Vec<String>,
}

impl<R: Record> EntityModel<R> {
    pub fn new(name: impl Into<String>, id_key: IdKey<R>) -> Self {
        Self {
            name: name.into(),
            id_key,
            fields: Vec::new(),
            prefilters: Vec::new(),
            lookups: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, field: FieldModel) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn with_prefilter(mut self, prefilter: PrefilterModel) -> Self {
        self.prefilters.push(prefilter);
        self
    }

    #[must_use]
    pub fn with_lookup(mut self, field: impl Into<String>) -> Self {
        self.lookups.push(field.into());
        self
    }

    /// Extract the id for `record`.
    pub fn id_of(&self, record: &R) -> Result<Value, EngineError> {
        self.id_key.id_of(&self.name, record)
    }

    /// Default order field (the first configured field).
    ///
    /// Validation guarantees at least one field, so this cannot fail after
    /// a successful warm.
    pub fn first_field(&self) -> Result<&FieldModel, EngineError> {
        self.fields
            .first()
            .ok_or_else(|| EngineError::invariant(ErrorOrigin::Engine, "entity model has no fields"))
    }

    #[must_use]
    pub fn field_model(&self, name: &str) -> Option<&FieldModel> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Prefilter list with the implicit global scope guaranteed present,
    /// global-first.
    #[must_use]
    pub fn normalized_prefilters(&self) -> Vec<PrefilterModel> {
        let mut out = Vec::with_capacity(self.prefilters.len() + 1);
        if !self.prefilters.iter().any(|pf| pf.field.is_none()) {
            out.push(PrefilterModel::default());
        }
        out.extend(self.prefilters.iter().cloned());
        out
    }

    /// Warm-time configuration validation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fields.is_empty() {
            return Err(ConfigError::NoFields {
                entity: self.name.clone(),
            });
        }

        // The global scope is implicit; an explicit bare entry is a config
        // mistake (it can only shadow the implicit one).
        if self
            .prefilters
            .iter()
            .any(|pf| pf.field.is_none() && pf.maintain_unique.is_empty())
        {
            return Err(ConfigError::BareGlobalPrefilter {
                entity: self.name.clone(),
            });
        }

        Ok(())
    }

    /// Every field name the engine will read off records of this entity.
    pub(crate) fn required_fields(&self) -> impl Iterator<Item = &str> {
        let id_field = self.id_key.field_name();
        self.fields
            .iter()
            .map(|f| f.name.as_str())
            .chain(self.prefilters.iter().filter_map(|pf| pf.field.as_deref()))
            .chain(
                self.prefilters
                    .iter()
                    .flat_map(|pf| pf.maintain_unique.iter().map(String::as_str)),
            )
            .chain(self.lookups.iter().map(String::as_str))
            .chain(id_field)
    }

    /// Reject records that lack any configured field before state is touched.
    pub(crate) fn validate_record(&self, record: &R) -> Result<(), EngineError> {
        for field in self.required_fields() {
            if record.field(field).is_none() {
                return Err(EngineError::missing_field(&self.name, field));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{EntityModel, IdKey};
    use crate::{
        error::ErrorClass,
        model::{ConfigError, field::FieldModel, prefilter::PrefilterModel},
        traits::Record,
        value::Value,
    };

    #[derive(Clone, Debug, PartialEq)]
    struct Car {
        id: u64,
        make: String,
    }

    impl Record for Car {
        fn field(&self, name: &str) -> Option<Value> {
            match name {
                "id" => Some(Value::Uint(self.id)),
                "make" => Some(Value::text(self.make.clone())),
                _ => None,
            }
        }
    }

    fn car_model() -> EntityModel<Car> {
        EntityModel::new("cars", IdKey::Field("id".into()))
            .with_field(FieldModel::natural("make"))
    }

    #[test]
    fn id_extraction_reads_the_configured_field() {
        let model = car_model();
        let car = Car {
            id: 4,
            make: "Mazda".into(),
        };
        assert_eq!(model.id_of(&car).expect("id"), Value::Uint(4));
    }

    #[test]
    fn extract_id_key_uses_the_function() {
        let model = EntityModel::new("cars", IdKey::Extract(|car: &Car| Value::Uint(car.id * 2)))
            .with_field(FieldModel::natural("make"));
        let car = Car {
            id: 4,
            make: "Mazda".into(),
        };
        assert_eq!(model.id_of(&car).expect("id"), Value::Uint(8));
    }

    #[test]
    fn normalized_prefilters_inserts_the_implicit_global_scope() {
        let model = car_model().with_prefilter(PrefilterModel::on_field("make", vec![]));
        let normalized = model.normalized_prefilters();
        assert_eq!(normalized.len(), 2);
        assert!(normalized[0].field.is_none());
        assert_eq!(normalized[1].field.as_deref(), Some("make"));
    }

    #[test]
    fn explicit_global_with_options_is_kept_as_is() {
        let model = car_model().with_prefilter(PrefilterModel::global(vec!["make".into()]));
        let normalized = model.normalized_prefilters();
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].maintain_unique, vec!["make".to_string()]);
    }

    #[test]
    fn bare_global_prefilter_is_rejected() {
        let model = car_model().with_prefilter(PrefilterModel::global(vec![]));
        let err = model.validate().expect_err("bare global must be rejected");
        assert!(matches!(err, ConfigError::BareGlobalPrefilter { .. }));
    }

    #[test]
    fn record_missing_a_configured_field_is_rejected() {
        let model = car_model().with_lookup("color");
        let car = Car {
            id: 1,
            make: "Mazda".into(),
        };
        let err = model
            .validate_record(&car)
            .expect_err("missing lookup field must be rejected");
        assert_eq!(err.class, ErrorClass::MissingField);
    }
}
