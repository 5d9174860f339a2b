use crate::value::Value;
use std::fmt::Debug;

///
/// Record
///
/// The engine's view of one stored row. Implementations expose configured
/// fields by name; the engine owns clones of everything handed to it, so
/// external mutation of a caller-held record is never observable.
///
/// Heterogeneous deployments (several entities with different shapes in one
/// engine) implement this on a caller-side sum type.
///

pub trait Record: Clone + Debug + PartialEq {
    /// Fetch one field by name. `None` means the record does not carry the
    /// field at all; a present-but-empty field is `Some(Value::Null)`.
    fn field(&self, name: &str) -> Option<Value>;
}

///
/// Predicate
///
/// Record-level membership test captured by a view. Kept behind a trait so
/// view specs stay inspectable (`params`) while the match logic is opaque.
///

pub trait Predicate<R>: Send + Sync {
    fn matches(&self, record: &R) -> bool;
}

impl<R, F> Predicate<R> for F
where
    F: Fn(&R) -> bool + Send + Sync,
{
    fn matches(&self, record: &R) -> bool {
        self(record)
    }
}

#[cfg(test)]
mod tests {
    use super::{Predicate, Record};
    use crate::value::Value;

    #[derive(Clone, Debug, PartialEq)]
    struct Pair {
        id: u64,
        label: String,
    }

    impl Record for Pair {
        fn field(&self, name: &str) -> Option<Value> {
            match name {
                "id" => Some(Value::Uint(self.id)),
                "label" => Some(Value::text(self.label.clone())),
                _ => None,
            }
        }
    }

    #[test]
    fn closures_are_predicates() {
        let pred = |record: &Pair| record.label.contains("Lo");
        let hit = Pair {
            id: 1,
            label: "London Elektricity".into(),
        };
        let miss = Pair {
            id: 2,
            label: "Hybrid Minds".into(),
        };

        assert!(Predicate::matches(&pred, &hit));
        assert!(!Predicate::matches(&pred, &miss));
    }

    #[test]
    fn unknown_fields_read_as_none() {
        let rec = Pair {
            id: 9,
            label: "x".into(),
        };
        assert!(rec.field("missing").is_none());
        assert_eq!(rec.field("id"), Some(Value::Uint(9)));
    }
}
