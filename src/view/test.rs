use super::sort::*;
use super::transform::derive_view;

use crate::document::{Row, Table, Value};

fn make_table(columns: Vec<&str>, rows: Vec<Vec<(&str, Value)>>) -> Table {
    let rows = rows
        .into_iter()
        .map(|cells| {
            cells
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect::<Row>()
        })
        .collect();
    Table::new(
        "tbl_test",
        "Test",
        columns.into_iter().map(|c| c.to_string()).collect(),
        rows,
    )
}

/// The two-row table from the grid's reference scenario
fn ab_table() -> Table {
    make_table(
        vec!["A", "B"],
        vec![
            vec![("A", Value::from("x")), ("B", Value::from(2.0))],
            vec![("A", Value::from("y")), ("B", Value::from(1.0))],
        ],
    )
}

// ---- Sort cycle state machine ----

#[test]
fn cycle_visits_asc_desc_none_and_repeats() {
    let mut spec = SortSpec::none();

    spec.cycle("C");
    assert_eq!(spec.column.as_deref(), Some("C"));
    assert_eq!(spec.direction, Some(SortDirection::Ascending));

    spec.cycle("C");
    assert_eq!(spec.direction, Some(SortDirection::Descending));

    spec.cycle("C");
    assert_eq!(spec, SortSpec::none());

    spec.cycle("C");
    assert_eq!(spec.direction, Some(SortDirection::Ascending));
}

#[test]
fn cycle_on_a_different_column_always_starts_ascending() {
    let mut spec = SortSpec::none();
    spec.cycle("C");
    spec.cycle("C"); // {C, desc}

    spec.cycle("D");
    assert_eq!(spec.column.as_deref(), Some("D"));
    assert_eq!(spec.direction, Some(SortDirection::Ascending));
}

// ---- Filtering ----

#[test]
fn empty_filter_returns_all_rows_in_order() {
    let table = ab_table();
    assert_eq!(derive_view(&table, "", &SortSpec::none()), vec![0, 1]);
}

#[test]
fn filter_is_a_case_insensitive_substring_match_over_all_columns() {
    let table = make_table(
        vec!["Name", "City"],
        vec![
            vec![("Name", Value::from("Alice")), ("City", Value::from("Lisbon"))],
            vec![("Name", Value::from("Bob")), ("City", Value::from("Berlin"))],
            vec![("Name", Value::from("Carol")), ("City", Value::from("OSLO"))],
        ],
    );

    // matches against any column, ignoring case
    assert_eq!(derive_view(&table, "LIS", &SortSpec::none()), vec![0]);
    assert_eq!(derive_view(&table, "b", &SortSpec::none()), vec![0, 1]);
    assert_eq!(derive_view(&table, "oslo", &SortSpec::none()), vec![2]);
    assert!(derive_view(&table, "zurich", &SortSpec::none()).is_empty());
}

#[test]
fn filter_matches_the_display_form_of_numbers() {
    let table = make_table(
        vec!["N"],
        vec![
            vec![("N", Value::from(1042.0))],
            vec![("N", Value::from(7.0))],
        ],
    );
    assert_eq!(derive_view(&table, "042", &SortSpec::none()), vec![0]);
}

#[test]
fn filtered_view_is_a_subset_of_the_row_indices() {
    let table = make_table(
        vec!["A"],
        vec![
            vec![("A", Value::from("ax"))],
            vec![("A", Value::from("bx"))],
            vec![("A", Value::from("c"))],
        ],
    );
    let view = derive_view(&table, "x", &SortSpec::none());
    assert!(view.iter().all(|&i| i < table.row_count()));
    for &i in &view {
        let matched = table.rows[i]
            .values()
            .any(|v| v.display().to_lowercase().contains("x"));
        assert!(matched);
    }
}

// ---- Sorting ----

fn spec(column: &str, direction: SortDirection) -> SortSpec {
    SortSpec {
        column: Some(column.to_string()),
        direction: Some(direction),
    }
}

#[test]
fn reference_scenario_sort_and_filter() {
    let table = ab_table();

    // sort by B ascending: {y,1} before {x,2}
    assert_eq!(
        derive_view(&table, "", &spec("B", SortDirection::Ascending)),
        vec![1, 0]
    );
    // cycle again -> descending
    assert_eq!(
        derive_view(&table, "", &spec("B", SortDirection::Descending)),
        vec![0, 1]
    );
    // filter "y" with no sort
    assert_eq!(derive_view(&table, "y", &SortSpec::none()), vec![1]);
}

#[test]
fn sort_without_direction_is_ignored() {
    let table = ab_table();
    let half_set = SortSpec {
        column: Some("B".to_string()),
        direction: None,
    };
    assert_eq!(derive_view(&table, "", &half_set), vec![0, 1]);
}

#[test]
fn null_and_missing_cells_sort_last_in_both_directions() {
    let table = make_table(
        vec!["N"],
        vec![
            vec![("N", Value::Null)],
            vec![("N", Value::from(5.0))],
            vec![], // column entirely absent
            vec![("N", Value::from(3.0))],
        ],
    );

    assert_eq!(
        derive_view(&table, "", &spec("N", SortDirection::Ascending)),
        vec![3, 1, 0, 2]
    );
    assert_eq!(
        derive_view(&table, "", &spec("N", SortDirection::Descending)),
        vec![1, 3, 0, 2]
    );
}

#[test]
fn equal_keys_keep_input_order() {
    let table = make_table(
        vec!["G", "Tag"],
        vec![
            vec![("G", Value::from("same")), ("Tag", Value::from("first"))],
            vec![("G", Value::from("same")), ("Tag", Value::from("second"))],
            vec![("G", Value::from("same")), ("Tag", Value::from("third"))],
        ],
    );
    assert_eq!(
        derive_view(&table, "", &spec("G", SortDirection::Ascending)),
        vec![0, 1, 2]
    );
    assert_eq!(
        derive_view(&table, "", &spec("G", SortDirection::Descending)),
        vec![0, 1, 2]
    );
}

#[test]
fn numbers_sort_numerically_not_lexically() {
    let table = make_table(
        vec!["N"],
        vec![
            vec![("N", Value::from(10.0))],
            vec![("N", Value::from(9.0))],
            vec![("N", Value::from(100.0))],
        ],
    );
    assert_eq!(
        derive_view(&table, "", &spec("N", SortDirection::Ascending)),
        vec![1, 0, 2]
    );
}

#[test]
fn mixed_types_fall_back_to_display_order() {
    let table = make_table(
        vec!["V"],
        vec![
            vec![("V", Value::from("apple"))],
            vec![("V", Value::from(3.0))],
            vec![("V", Value::from("10"))],
        ],
    );
    // display forms: "apple", "3", "10" -> "10" < "3" < "apple"
    assert_eq!(
        derive_view(&table, "", &spec("V", SortDirection::Ascending)),
        vec![2, 1, 0]
    );
}

#[test]
fn filter_and_sort_compose() {
    let table = make_table(
        vec!["Name", "Qty"],
        vec![
            vec![("Name", Value::from("bolt")), ("Qty", Value::from(9.0))],
            vec![("Name", Value::from("nut")), ("Qty", Value::from(4.0))],
            vec![("Name", Value::from("bracket")), ("Qty", Value::from(2.0))],
        ],
    );
    let view = derive_view(&table, "b", &spec("Qty", SortDirection::Ascending));
    assert_eq!(view, vec![2, 0]);
}
