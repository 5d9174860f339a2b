//! View delta broadcasting boundary.
//!
//! The engine never owns a transport; callers inject a `Broadcaster` and the
//! engine publishes one message per view transition to the view's
//! fingerprint topic. Everything here is the boundary contract only.

use crate::value::Value;

///
/// ViewEvent
///
/// One observable view delta. `Uniques` batches the distinct-value changes
/// a single mutation caused inside one maintained field.
///

#[derive(Clone, Debug, PartialEq)]
pub enum ViewEvent<R> {
    Added { fingerprint: String, record: R },
    Removed { fingerprint: String, id: Value },
    Updated { fingerprint: String, record: R },
    Uniques {
        fingerprint: String,
        field: String,
        events: Vec<UniquesChange>,
    },
}

///
/// UniquesChange
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum UniquesChange {
    Add(Value),
    Remove(Value),
}

///
/// Broadcaster
///
/// Injected publish sink. Topics are view fingerprints.
///

pub trait Broadcaster<R>: Send + Sync {
    fn publish(&self, topic: &str, event: ViewEvent<R>);
}

///
/// NoopBroadcaster
///

pub struct NoopBroadcaster;

impl<R> Broadcaster<R> for NoopBroadcaster {
    fn publish(&self, _: &str, _: ViewEvent<R>) {}
}
