use crate::value::Value;
use std::fmt;

///
/// Prefilter
///
/// Scope selector for derived structures: every record of the entity, the
/// records matching one `(field, value)` equality, or the records selected
/// by a registered view.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Prefilter {
    Global,
    Field { field: String, value: Value },
    View { fingerprint: String },
}

impl Prefilter {
    pub fn on_field(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Field {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn view(fingerprint: impl Into<String>) -> Self {
        Self::View {
            fingerprint: fingerprint.into(),
        }
    }

    #[must_use]
    pub const fn is_global(&self) -> bool {
        matches!(self, Self::Global)
    }
}

impl Default for Prefilter {
    fn default() -> Self {
        Self::Global
    }
}

// Stable tag rendering used inside every derived-structure key.
impl fmt::Display for Prefilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "[]"),
            Self::Field { field, value } => write!(f, "[{field}={value}]"),
            Self::View { fingerprint } => write!(f, "{fingerprint}"),
        }
    }
}

///
/// PrefilterModel
///
/// Warm-time configuration of one prefilter scope. `field: None` is the
/// global scope; it is implicit and only appears in caller config to attach
/// `maintain_unique` fields to the whole entity.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PrefilterModel {
    pub field: Option<String>,
    pub maintain_unique: Vec<String>,
}

impl PrefilterModel {
    /// Global scope carrying `maintain_unique` fields.
    pub fn global(maintain_unique: Vec<String>) -> Self {
        Self {
            field: None,
            maintain_unique,
        }
    }

    /// Value-partitioned scope over `field`.
    pub fn on_field(field: impl Into<String>, maintain_unique: Vec<String>) -> Self {
        Self {
            field: Some(field.into()),
            maintain_unique,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Prefilter;
    use crate::value::Value;

    #[test]
    fn tag_rendering_is_stable() {
        assert_eq!(Prefilter::Global.to_string(), "[]");
        assert_eq!(
            Prefilter::on_field("label", Value::text("Hospital Records")).to_string(),
            "[label=Hospital Records]"
        );
        assert_eq!(
            Prefilter::view("0123456789abcdef01234567").to_string(),
            "0123456789abcdef01234567"
        );
    }
}
