use std::fmt;
use thiserror::Error as ThisError;

///
/// EngineError
/// Structured runtime error with a stable internal classification.
/// Every fallible public operation funnels through this type.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("{message}")]
pub struct EngineError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl EngineError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    pub fn entity_not_found(entity: &str) -> Self {
        Self::new(
            ErrorClass::NotFound,
            ErrorOrigin::Engine,
            format!("entity '{entity}' is not warmed"),
        )
    }

    pub fn record_not_found(entity: &str) -> Self {
        Self::new(
            ErrorClass::NotFound,
            ErrorOrigin::Engine,
            format!("no record with that id in entity '{entity}'"),
        )
    }

    pub fn view_not_found(entity: &str, fingerprint: &str) -> Self {
        Self::new(
            ErrorClass::NotFound,
            ErrorOrigin::View,
            format!("no view '{fingerprint}' registered for entity '{entity}'"),
        )
    }

    pub fn view_duplicate(entity: &str, fingerprint: &str) -> Self {
        Self::new(
            ErrorClass::Duplicate,
            ErrorOrigin::View,
            format!("view '{fingerprint}' already registered for entity '{entity}'"),
        )
    }

    pub fn missing_field(entity: &str, field: &str) -> Self {
        Self::new(
            ErrorClass::MissingField,
            ErrorOrigin::Engine,
            format!("record for entity '{entity}' lacks configured field '{field}'"),
        )
    }

    pub fn invariant(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::InvariantViolation, origin, message)
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::NotFound)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorClass
/// Error taxonomy mirrored by the public failure semantics.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Config,
    NotFound,
    Duplicate,
    MissingField,
    BadCursor,
    InvariantViolation,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Config => "config",
            Self::NotFound => "not_found",
            Self::Duplicate => "duplicate",
            Self::MissingField => "missing_field",
            Self::BadCursor => "bad_cursor",
            Self::InvariantViolation => "invariant_violation",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Which layer raised the error.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Warm,
    Engine,
    Index,
    Uniques,
    View,
    Paginate,
    Codec,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Warm => "warm",
            Self::Engine => "engine",
            Self::Index => "index",
            Self::Uniques => "uniques",
            Self::View => "view",
            Self::Paginate => "paginate",
            Self::Codec => "codec",
        };
        write!(f, "{label}")
    }
}
