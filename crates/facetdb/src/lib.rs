//! Core runtime for facetdb: an in-memory, multi-index record store.
//!
//! Callers warm the engine with typed record collections; it maintains a
//! primary store, per-field sorted id pairs, value-partitioned prefilter
//! indexes, uniques bundles, reverse lookups, and registered views, all
//! kept mutually consistent under put/remove. Cursor pagination runs over
//! any of the sorted lists.
#![warn(unreachable_pub)]

pub mod direction;
pub mod engine;
pub mod error;
pub mod index;
pub mod key;
pub mod lookup;
pub mod model;
pub mod paginate;
pub mod pubsub;
pub mod traits;
pub mod uniques;
pub mod value;
pub mod view;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, stores, codecs, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        direction::Direction,
        engine::{Engine, EntityData, OrderHint, WarmEntry},
        model::{EntityModel, FieldModel, IdKey, Prefilter, PrefilterModel, SortStrategy},
        traits::{Predicate, Record},
        value::Value,
        view::{ViewSpec, fingerprint},
    };
}
