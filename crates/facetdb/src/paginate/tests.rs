use crate::{
    direction::Direction,
    error::ErrorClass,
    paginate::{Cursor, ListPageArgs, paginate_list},
    test_fixtures::{Car, car},
    value::Value,
};
use std::collections::HashMap;

fn fleet() -> (Vec<Value>, HashMap<Value, Car>) {
    let cars = vec![
        car(1, "Audi"),
        car(2, "BMW"),
        car(3, "Citroen"),
        car(4, "Dacia"),
        car(5, "Ferrari"),
    ];
    let ids: Vec<Value> = cars.iter().map(|c| Value::Uint(c.id)).collect();
    let records: HashMap<Value, Car> = cars
        .into_iter()
        .map(|c| (Value::Uint(c.id), c))
        .collect();
    (ids, records)
}

fn cursor_fields() -> Vec<(String, Direction)> {
    vec![
        ("make".to_string(), Direction::Asc),
        ("id".to_string(), Direction::Asc),
    ]
}

fn args<'a>(
    limit: usize,
    after: Option<&'a str>,
    before: Option<&'a str>,
    fields: &'a [(String, Direction)],
) -> ListPageArgs<'a, Car> {
    ListPageArgs {
        limit,
        after,
        before,
        cursor_fields: fields,
        id_field: "id",
        filter: None,
        prepare: None,
    }
}

fn makes(page: &[Car]) -> Vec<&str> {
    page.iter().map(|c| c.make.as_str()).collect()
}

#[test]
fn first_page_has_no_before_cursor_and_overflow_sets_after() {
    let (ids, records) = fleet();
    let getter = |id: &Value| records.get(id).cloned();
    let fields = cursor_fields();

    let page = paginate_list(&ids, &getter, &args(2, None, None, &fields)).expect("page");

    assert_eq!(makes(&page.entries), ["Audi", "BMW"]);
    assert!(page.metadata.before.is_none());
    assert!(page.metadata.after.is_some());
    assert_eq!(page.metadata.limit, 2);
    assert!(page.metadata.total_count.is_none());
    assert!(!page.metadata.total_count_cap_exceeded);
}

#[test]
fn after_cursor_resumes_past_the_cursor_record() {
    let (ids, records) = fleet();
    let getter = |id: &Value| records.get(id).cloned();
    let fields = cursor_fields();

    let first = paginate_list(&ids, &getter, &args(2, None, None, &fields)).expect("page");
    let after = first.metadata.after.expect("continuation cursor");

    let second =
        paginate_list(&ids, &getter, &args(2, Some(&after), None, &fields)).expect("page");
    assert_eq!(makes(&second.entries), ["Citroen", "Dacia"]);
    assert!(second.metadata.before.is_some());

    let after = second.metadata.after.expect("continuation cursor");
    let third = paginate_list(&ids, &getter, &args(2, Some(&after), None, &fields)).expect("page");
    assert_eq!(makes(&third.entries), ["Ferrari"]);
    assert!(third.metadata.after.is_none(), "exhausted list has no after");
    assert!(third.metadata.before.is_some());
}

#[test]
fn pages_chain_without_duplicates_or_gaps() {
    let (ids, records) = fleet();
    let getter = |id: &Value| records.get(id).cloned();
    let fields = cursor_fields();

    let mut seen: Vec<String> = Vec::new();
    let mut after: Option<String> = None;
    loop {
        let page = paginate_list(
            &ids,
            &getter,
            &args(2, after.as_deref(), None, &fields),
        )
        .expect("page");
        seen.extend(page.entries.iter().map(|c| c.make.clone()));
        match page.metadata.after {
            Some(next) => after = Some(next),
            None => break,
        }
    }

    assert_eq!(seen, ["Audi", "BMW", "Citroen", "Dacia", "Ferrari"]);
}

#[test]
fn filtered_pages_skip_non_matching_records() {
    let (ids, records) = fleet();
    let getter = |id: &Value| records.get(id).cloned();
    let fields = cursor_fields();
    let filter = |c: &Car| c.make != "BMW";

    let mut page_args = args(2, None, None, &fields);
    page_args.filter = Some(&filter);

    let page = paginate_list(&ids, &getter, &page_args).expect("page");
    assert_eq!(makes(&page.entries), ["Audi", "Citroen"]);
}

#[test]
fn before_cursor_is_absent_when_nothing_skipped_would_have_matched() {
    let (ids, records) = fleet();
    let getter = |id: &Value| records.get(id).cloned();
    let fields = cursor_fields();

    // cursor at BMW; only Audi precedes it and the filter rejects Audi
    let bmw = records.get(&Value::Uint(2)).cloned().expect("fixture");
    let after = Cursor::for_record(&bmw, &fields).encode().expect("encode");
    let filter = |c: &Car| c.make != "Audi";

    let mut page_args = args(2, Some(&after), None, &fields);
    page_args.filter = Some(&filter);

    let page = paginate_list(&ids, &getter, &page_args).expect("page");
    assert_eq!(makes(&page.entries), ["Citroen", "Dacia"]);
    assert!(
        page.metadata.before.is_none(),
        "nothing before the cursor passes the filter"
    );
}

#[test]
fn backward_paging_returns_the_preceding_page_in_forward_order() {
    let (ids, records) = fleet();
    let getter = |id: &Value| records.get(id).cloned();
    let fields = cursor_fields();

    // cursor at Ferrari; the two nearest-preceding records are Citroen, Dacia
    let ferrari = records.get(&Value::Uint(5)).cloned().expect("fixture");
    let before = Cursor::for_record(&ferrari, &fields)
        .encode()
        .expect("encode");

    let page = paginate_list(&ids, &getter, &args(2, None, Some(&before), &fields)).expect("page");
    assert_eq!(makes(&page.entries), ["Citroen", "Dacia"]);
    assert!(
        page.metadata.after.is_some(),
        "records exist after a backward page"
    );
    assert!(
        page.metadata.before.is_some(),
        "more than a page's worth precedes the cursor"
    );
}

#[test]
fn backward_paging_without_overflow_has_no_before_cursor() {
    let (ids, records) = fleet();
    let getter = |id: &Value| records.get(id).cloned();
    let fields = cursor_fields();

    let citroen = records.get(&Value::Uint(3)).cloned().expect("fixture");
    let before = Cursor::for_record(&citroen, &fields)
        .encode()
        .expect("encode");

    let page = paginate_list(&ids, &getter, &args(5, None, Some(&before), &fields)).expect("page");
    assert_eq!(makes(&page.entries), ["Audi", "BMW"]);
    assert!(page.metadata.before.is_none());
}

#[test]
fn prepare_runs_before_the_filter_sees_the_record() {
    let (ids, records) = fleet();
    let getter = |id: &Value| records.get(id).cloned();
    let fields = cursor_fields();
    let prepare = |mut c: Car| {
        c.make = c.make.to_ascii_uppercase();
        c
    };
    let filter = |c: &Car| c.make == "AUDI";

    let mut page_args = args(3, None, None, &fields);
    page_args.prepare = Some(&prepare);
    page_args.filter = Some(&filter);

    let page = paginate_list(&ids, &getter, &page_args).expect("page");
    assert_eq!(makes(&page.entries), ["AUDI"]);
}

#[test]
fn after_and_before_are_mutually_exclusive() {
    let (ids, records) = fleet();
    let getter = |id: &Value| records.get(id).cloned();
    let fields = cursor_fields();

    let err = paginate_list(&ids, &getter, &args(2, Some("aa"), Some("bb"), &fields))
        .expect_err("two cursors must be rejected");
    assert_eq!(err.class, ErrorClass::BadCursor);
}

#[test]
fn undecodable_cursors_fail_with_bad_cursor() {
    let (ids, records) = fleet();
    let getter = |id: &Value| records.get(id).cloned();
    let fields = cursor_fields();

    let err = paginate_list(&ids, &getter, &args(2, Some("zz"), None, &fields))
        .expect_err("garbage cursor must be rejected");
    assert_eq!(err.class, ErrorClass::BadCursor);
}

#[test]
fn unknown_after_cursor_id_yields_an_empty_page() {
    let (ids, records) = fleet();
    let getter = |id: &Value| records.get(id).cloned();
    let fields = cursor_fields();

    let ghost = car(99, "Ghost");
    let after = Cursor::for_record(&ghost, &fields).encode().expect("encode");

    let page = paginate_list(&ids, &getter, &args(2, Some(&after), None, &fields)).expect("page");
    assert!(page.entries.is_empty());
    assert!(page.metadata.after.is_none());
    assert!(page.metadata.before.is_none());
}
