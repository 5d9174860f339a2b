mod compare;
mod float;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};

// re-exports
pub use compare::{canonical_cmp, canonical_rank};
pub use float::{Float64, Float64Error};

///
/// Value
///
/// Tagged scalar carried by records for every configured field.
///
/// Null → the field holds no value; it still indexes and compares (first).
/// Timestamps are UTC instants and order chronologically.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float64(Float64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl Value {
    ///
    /// CONSTRUCTION
    ///

    /// Build a `Value::Text` from anything string-like.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Build a `Value::Float64`, rejecting non-finite payloads.
    pub fn float(v: f64) -> Result<Self, Float64Error> {
        Ok(Self::Float64(Float64::try_from(v)?))
    }

    /// Parse an RFC 3339 timestamp into a `Value::Timestamp`.
    pub fn timestamp_from_rfc3339(s: &str) -> Result<Self, chrono::ParseError> {
        Ok(Self::Timestamp(
            DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc),
        ))
    }

    ///
    /// TYPES
    ///

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Uint(_) | Self::Float64(_))
    }

    #[must_use]
    pub const fn as_text(&self) -> Option<&str> {
        if let Self::Text(s) = self {
            Some(s.as_str())
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_timestamp(&self) -> Option<&DateTime<Utc>> {
        if let Self::Timestamp(ts) = self {
            Some(ts)
        } else {
            None
        }
    }

    ///
    /// ORDERING
    ///

    /// Total canonical comparator used by all index and uniques surfaces.
    #[must_use]
    pub fn canonical_cmp(left: &Self, right: &Self) -> Ordering {
        compare::canonical_cmp(left, right)
    }
}

// NOTE:
// Value::partial_cmp is same-variant only and is NOT the comparator used by
// index maintenance. Use canonical_cmp for sorting and uniques lists.
impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.partial_cmp(b),
            (Self::Int(a), Self::Int(b)) => a.partial_cmp(b),
            (Self::Uint(a), Self::Uint(b)) => a.partial_cmp(b),
            (Self::Float64(a), Self::Float64(b)) => a.partial_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.partial_cmp(b),
            (Self::Timestamp(a), Self::Timestamp(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

// Key-encoding render: scalar payloads print directly, with no quoting.
// This rendering feeds prefilter tags and view fingerprints and must stay
// stable within a process lifetime.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Uint(u) => write!(f, "{u}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
        }
    }
}

macro_rules! impl_from_for {
    ( $( $type:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$type> for Value {
                fn from(v: $type) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_for! {
    bool               => Bool,
    i8                 => Int,
    i16                => Int,
    i32                => Int,
    i64                => Int,
    u8                 => Uint,
    u16                => Uint,
    u32                => Uint,
    u64                => Uint,
    &str               => Text,
    String             => Text,
    DateTime<Utc>      => Timestamp,
}

#[cfg(test)]
mod tests {
    use super::Value;

    #[test]
    fn display_renders_scalars_directly() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Int(-42).to_string(), "-42");
        assert_eq!(Value::Uint(7).to_string(), "7");
        assert_eq!(Value::text("Mazda").to_string(), "Mazda");
    }

    #[test]
    fn display_renders_timestamps_as_rfc3339() {
        let ts = Value::timestamp_from_rfc3339("2021-02-14T08:00:00Z").expect("timestamp");
        assert_eq!(ts.to_string(), "2021-02-14T08:00:00+00:00");
    }

    #[test]
    fn partial_cmp_is_same_variant_only() {
        assert!(Value::Int(1).partial_cmp(&Value::Uint(1)).is_none());
        assert!(Value::Int(1) < Value::Int(2));
    }

    #[test]
    fn from_impls_cover_common_scalars() {
        assert_eq!(Value::from(3i32), Value::Int(3));
        assert_eq!(Value::from(3u16), Value::Uint(3));
        assert_eq!(Value::from("x"), Value::text("x"));
    }
}
