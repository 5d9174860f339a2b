mod fingerprint;

use crate::{model::Prefilter, traits::Predicate, value::Value};
use std::{fmt, sync::Arc};

// re-exports
pub use fingerprint::{FINGERPRINT_LEN, fingerprint};

///
/// ViewSpec
///
/// A registered filtered result set: base prefilter, optional record
/// predicate, the fields whose uniques are maintained inside the view, and
/// the opaque parameters the fingerprint was derived from.
///

#[derive(Clone)]
pub struct ViewSpec<R> {
    pub prefilter: Prefilter,
    predicate: Option<Arc<dyn Predicate<R>>>,
    pub maintain_unique: Vec<String>,
    pub params: Vec<(String, Value)>,
}

impl<R> ViewSpec<R> {
    #[must_use]
    pub fn new(prefilter: Prefilter) -> Self {
        Self {
            prefilter,
            predicate: None,
            maintain_unique: Vec::new(),
            params: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_predicate(mut self, predicate: impl Predicate<R> + 'static) -> Self {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    #[must_use]
    pub fn with_maintain_unique(mut self, fields: Vec<String>) -> Self {
        self.maintain_unique = fields;
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: Vec<(String, Value)>) -> Self {
        self.params = params;
        self
    }

    /// Record-level test of this view's predicate alone; the base prefilter
    /// is checked by the engine.
    #[must_use]
    pub fn predicate_matches(&self, record: &R) -> bool {
        self.predicate
            .as_ref()
            .is_none_or(|predicate| predicate.matches(record))
    }

    /// Fingerprint of this spec's parameter list.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.params)
    }
}

impl<R> fmt::Debug for ViewSpec<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewSpec")
            .field("prefilter", &self.prefilter)
            .field(
                "predicate",
                &self.predicate.as_ref().map(|_| "<predicate>"),
            )
            .field("maintain_unique", &self.maintain_unique)
            .field("params", &self.params)
            .finish()
    }
}
