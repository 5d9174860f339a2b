//! Module: paginate
//! Responsibility: cursor-based forward/backward paging over a presorted
//! id list, with optional record-level filtering.
//! Does not own: index selection (the engine picks the sorted list) or the
//! sort itself — the list arrives in final order.

mod cursor;

#[cfg(test)]
mod tests;

use crate::{
    direction::Direction,
    engine::Engine,
    error::{EngineError, ErrorClass, ErrorOrigin},
    model::Prefilter,
    traits::Record,
    value::Value,
};

// re-exports
pub use cursor::{Cursor, CursorError};

pub const DEFAULT_LIMIT: usize = 10;

///
/// PageMetadata
///
/// Continuation state of one page. Total counts are not produced by this
/// engine and always read as absent.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PageMetadata {
    pub after: Option<String>,
    pub before: Option<String>,
    pub limit: usize,
    pub total_count: Option<usize>,
    pub total_count_cap_exceeded: bool,
}

///
/// Page
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Page<R> {
    pub entries: Vec<R>,
    pub metadata: PageMetadata,
}

impl<R> Page<R> {
    fn empty(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            metadata: PageMetadata {
                limit,
                ..PageMetadata::default()
            },
        }
    }
}

///
/// PaginateParams
///
/// Engine-level paging request. `order_by` picks the sorted index to walk
/// (default: first configured field, ascending); an `(id, asc)` tiebreaker
/// is appended to the cursor fields implicitly.
///

pub struct PaginateParams<R> {
    pub limit: Option<usize>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub order_by: Option<(String, Direction)>,
    pub prefilter: Prefilter,
    pub filter: Option<Box<dyn Fn(&R) -> bool>>,
    pub prepare: Option<Box<dyn Fn(R) -> R>>,
    pub id_field: Option<String>,
}

impl<R> Default for PaginateParams<R> {
    fn default() -> Self {
        Self {
            limit: None,
            after: None,
            before: None,
            order_by: None,
            prefilter: Prefilter::Global,
            filter: None,
            prepare: None,
            id_field: None,
        }
    }
}

impl<R> PaginateParams<R> {
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    #[must_use]
    pub fn with_before(mut self, cursor: impl Into<String>) -> Self {
        self.before = Some(cursor.into());
        self
    }

    #[must_use]
    pub fn with_order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    #[must_use]
    pub fn with_prefilter(mut self, prefilter: Prefilter) -> Self {
        self.prefilter = prefilter;
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: impl Fn(&R) -> bool + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    #[must_use]
    pub fn with_prepare(mut self, prepare: impl Fn(R) -> R + 'static) -> Self {
        self.prepare = Some(Box::new(prepare));
        self
    }

    #[must_use]
    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = Some(field.into());
        self
    }
}

// Internal request over one presorted id list.
pub(crate) struct ListPageArgs<'a, R> {
    pub(crate) limit: usize,
    pub(crate) after: Option<&'a str>,
    pub(crate) before: Option<&'a str>,
    pub(crate) cursor_fields: &'a [(String, Direction)],
    pub(crate) id_field: &'a str,
    pub(crate) filter: Option<&'a dyn Fn(&R) -> bool>,
    pub(crate) prepare: Option<&'a dyn Fn(R) -> R>,
}

impl<R: Record> Engine<R> {
    /// Page through one sorted sub-index.
    pub fn paginate(&self, entity: &str, params: &PaginateParams<R>) -> Result<Page<R>, EngineError> {
        let model = self.model(entity)?;

        let (order_field, direction) = match &params.order_by {
            Some((field, direction)) => (field.clone(), *direction),
            None => (model.first_field()?.name.clone(), Direction::Asc),
        };

        let id_field = params
            .id_field
            .clone()
            .or_else(|| model.id_key.field_name().map(str::to_string))
            .unwrap_or_else(|| "id".to_string());

        let mut cursor_fields = vec![(order_field.clone(), direction)];
        if order_field != id_field {
            cursor_fields.push((id_field.clone(), Direction::Asc));
        }

        let ids = self
            .indexes
            .ids(entity, &params.prefilter, direction, &order_field)
            .cloned()
            .unwrap_or_default();
        let records = &self.state(entity)?.records;
        let getter = |id: &Value| records.get(id).cloned();

        paginate_list(
            &ids,
            &getter,
            &ListPageArgs {
                limit: params.limit.unwrap_or(DEFAULT_LIMIT),
                after: params.after.as_deref(),
                before: params.before.as_deref(),
                cursor_fields: &cursor_fields,
                id_field: &id_field,
                filter: params.filter.as_deref(),
                prepare: params.prepare.as_deref(),
            },
        )
    }
}

pub(crate) fn paginate_list<R: Record>(
    ids: &[Value],
    getter: &dyn Fn(&Value) -> Option<R>,
    args: &ListPageArgs<'_, R>,
) -> Result<Page<R>, EngineError> {
    if args.after.is_some() && args.before.is_some() {
        return Err(EngineError::new(
            ErrorClass::BadCursor,
            ErrorOrigin::Paginate,
            "after and before cursors are mutually exclusive",
        ));
    }

    match args.before {
        Some(before) => paginate_backward(ids, getter, args, before),
        None => paginate_forward(ids, getter, args),
    }
}

// Forward fold: scan to the cursor position, then collect filtered records
// until one past the limit. The before-cursor is computed retroactively
// from the ids skipped ahead of the cursor.
fn paginate_forward<R: Record>(
    ids: &[Value],
    getter: &dyn Fn(&Value) -> Option<R>,
    args: &ListPageArgs<'_, R>,
) -> Result<Page<R>, EngineError> {
    let after_id = match args.after {
        Some(token) => {
            let decoded = Cursor::decode(token)?;
            Some(
                decoded
                    .value(args.id_field)
                    .ok_or_else(|| CursorError::MissingIdField(args.id_field.to_string()))?
                    .clone(),
            )
        }
        None => None,
    };

    let mut scanning = after_id.is_none();
    let mut read_ids: Vec<&Value> = Vec::new();
    let mut entries: Vec<R> = Vec::new();
    let mut cursor_before: Option<String> = None;

    for id in ids {
        if !scanning {
            if Some(id) == after_id.as_ref() {
                scanning = true;
            } else {
                read_ids.push(id);
            }
            continue;
        }

        let Some(record) = fetch(getter, args.prepare, id) else {
            continue;
        };
        if !passes(args.filter, &record) {
            continue;
        }

        if entries.is_empty() && after_id.is_some() {
            let had_previous = match args.filter {
                None => true,
                Some(filter) => read_ids
                    .iter()
                    .any(|read_id| fetch(getter, args.prepare, read_id).is_some_and(|r| filter(&r))),
            };
            if had_previous {
                cursor_before = Some(Cursor::for_record(&record, args.cursor_fields).encode()?);
            }
        }

        entries.push(record);
        if entries.len() == args.limit + 1 {
            break;
        }
    }

    let mut cursor_after = None;
    if entries.len() > args.limit {
        entries.pop();
        if let Some(last) = entries.last() {
            cursor_after = Some(Cursor::for_record(last, args.cursor_fields).encode()?);
        }
    }

    Ok(Page {
        entries,
        metadata: PageMetadata {
            after: cursor_after,
            before: cursor_before,
            limit: args.limit,
            total_count: None,
            total_count_cap_exceeded: false,
        },
    })
}

// Backward fold: collect the ids preceding the cursor, then walk them
// nearest-first. The page is returned in forward order; the after-cursor
// anchors at its last entry, the before-cursor only exists when one more
// than a page's worth preceded.
fn paginate_backward<R: Record>(
    ids: &[Value],
    getter: &dyn Fn(&Value) -> Option<R>,
    args: &ListPageArgs<'_, R>,
    before: &str,
) -> Result<Page<R>, EngineError> {
    let decoded = Cursor::decode(before)?;
    let target = decoded
        .value(args.id_field)
        .ok_or_else(|| CursorError::MissingIdField(args.id_field.to_string()))?
        .clone();

    let mut preceding: Vec<&Value> = Vec::new();
    let mut found = false;
    for id in ids {
        if *id == target {
            found = true;
            break;
        }
        preceding.push(id);
    }
    if !found {
        return Ok(Page::empty(args.limit));
    }

    let mut collected: Vec<R> = Vec::new();
    let mut cursor_after = None;
    let mut cursor_before = None;

    for id in preceding.iter().rev() {
        let Some(record) = fetch(getter, args.prepare, id) else {
            continue;
        };
        if !passes(args.filter, &record) {
            continue;
        }

        if collected.is_empty() {
            cursor_after = Some(Cursor::for_record(&record, args.cursor_fields).encode()?);
        }

        collected.push(record);
        if collected.len() == args.limit + 1 {
            collected.pop();
            if let Some(first_on_page) = collected.last() {
                cursor_before =
                    Some(Cursor::for_record(first_on_page, args.cursor_fields).encode()?);
            }
            break;
        }
    }

    collected.reverse();

    Ok(Page {
        entries: collected,
        metadata: PageMetadata {
            after: cursor_after,
            before: cursor_before,
            limit: args.limit,
            total_count: None,
            total_count_cap_exceeded: false,
        },
    })
}

fn fetch<R: Record>(
    getter: &dyn Fn(&Value) -> Option<R>,
    prepare: Option<&dyn Fn(R) -> R>,
    id: &Value,
) -> Option<R> {
    let record = getter(id)?;
    Some(match prepare {
        Some(prepare) => prepare(record),
        None => record,
    })
}

fn passes<R>(filter: Option<&dyn Fn(&R) -> bool>, record: &R) -> bool {
    filter.is_none_or(|filter| filter(record))
}
