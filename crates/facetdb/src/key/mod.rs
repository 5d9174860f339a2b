//! Module: key
//! Responsibility: deterministic string keys for every derived structure.
//! Does not own: the structures themselves or their maintenance rules.
//! Boundary: keys are internal identifiers, stable within one process
//! lifetime; mutation code derives them repeatedly and relies on equality.

use crate::{direction::Direction, model::Prefilter};

/// Key of one sorted id list: `idx_{entity}{pf_tag}{dir}_{field}`.
#[must_use]
pub fn index_key(entity: &str, prefilter: &Prefilter, dir: Direction, field: &str) -> String {
    format!("idx_{entity}{prefilter}{dir}_{field}")
}

/// Key of one uniques counts map: `uniques_map_{entity}{pf_tag}{field}`.
#[must_use]
pub fn uniques_map_key(entity: &str, prefilter: &Prefilter, field: &str) -> String {
    format!("uniques_map_{entity}{prefilter}{field}")
}

/// Key of one sorted uniques list: `uniques_list_{entity}{pf_tag}{field}`.
#[must_use]
pub fn uniques_list_key(entity: &str, prefilter: &Prefilter, field: &str) -> String {
    format!("uniques_list_{entity}{prefilter}{field}")
}

/// Key of one reverse lookup map: `lookup_{entity}{field}`.
#[must_use]
pub fn lookup_key(entity: &str, field: &str) -> String {
    format!("lookup_{entity}{field}")
}
