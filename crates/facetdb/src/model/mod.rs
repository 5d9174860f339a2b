pub mod entity;
pub mod field;
pub mod prefilter;

use crate::error::{EngineError, ErrorClass, ErrorOrigin};
use thiserror::Error as ThisError;

// re-exports
pub use entity::{EntityModel, IdKey};
pub use field::{FieldModel, SortStrategy};
pub use prefilter::{Prefilter, PrefilterModel};

///
/// ConfigError
///
/// Warm-time rejection of malformed entity configuration.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ConfigError {
    #[error("entity '{entity}' configures no sortable fields")]
    NoFields { entity: String },

    #[error("entity '{entity}' lists a bare global prefilter; the global scope is implicit")]
    BareGlobalPrefilter { entity: String },

    #[error("entity '{entity}' order hint names unknown field '{field}'")]
    UnknownHintField { entity: String, field: String },
}

impl From<ConfigError> for EngineError {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorClass::Config, ErrorOrigin::Warm, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::ConfigError;
    use crate::error::{EngineError, ErrorClass, ErrorOrigin};

    #[test]
    fn config_errors_convert_into_warm_config_class() {
        let err: EngineError = ConfigError::UnknownHintField {
            entity: "cars".into(),
            field: "wheels".into(),
        }
        .into();

        assert_eq!(err.class, ErrorClass::Config);
        assert_eq!(err.origin, ErrorOrigin::Warm);
        assert!(err.message.contains("wheels"));
    }
}
