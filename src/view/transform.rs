//! Filter + sort derivation over a table's rows
//!
//! `derive_view` is a pure function of the table, the filter text and
//! the sort directive: it owns no state and can be recomputed whenever
//! any input changes. It returns indices into `table.rows` so the
//! original row order stays available for tie-breaking and identity.

use std::cmp::Ordering;

use rayon::prelude::*;

use crate::document::{Row, Table};
use crate::view::sort::{compare_keys, sort_key, SortDirection, SortKey, SortSpec};

/// Threshold for filtering with data parallelism
const PARALLEL_THRESHOLD: usize = 10_000;

pub fn derive_view(table: &Table, filter_text: &str, sort: &SortSpec) -> Vec<usize> {
    let mut indices = filter_rows(table, filter_text);
    if let (Some(column), Some(direction)) = (sort.column.as_deref(), sort.direction) {
        sort_indices(table, &mut indices, column, direction);
    }
    indices
}

/// A row passes when any cell's lower-cased display form contains the
/// lower-cased filter text. Empty filter text passes everything.
fn row_matches(row: &Row, needle: &str) -> bool {
    row.values()
        .any(|v| v.display().to_lowercase().contains(needle))
}

fn filter_rows(table: &Table, filter_text: &str) -> Vec<usize> {
    if filter_text.is_empty() {
        return (0..table.rows.len()).collect();
    }

    let needle = filter_text.to_lowercase();
    if table.rows.len() >= PARALLEL_THRESHOLD {
        table
            .rows
            .par_iter()
            .enumerate()
            .filter(|(_, row)| row_matches(row, &needle))
            .map(|(idx, _)| idx)
            .collect()
    } else {
        table
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row_matches(row, &needle))
            .map(|(idx, _)| idx)
            .collect()
    }
}

fn sort_indices(table: &Table, indices: &mut Vec<usize>, column: &str, direction: SortDirection) {
    let mut keyed: Vec<(usize, Option<SortKey>)> = indices
        .iter()
        .map(|&idx| (idx, sort_key(table.rows[idx].get(column))))
        .collect();

    keyed.sort_by(|(idx_a, key_a), (idx_b, key_b)| {
        // Null and missing cells go last in both directions; only
        // defined-vs-defined comparisons honor the direction.
        let base = match (key_a, key_b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => match direction {
                SortDirection::Ascending => compare_keys(a, b),
                SortDirection::Descending => compare_keys(a, b).reverse(),
            },
        };
        base.then(idx_a.cmp(idx_b))
    });

    *indices = keyed.into_iter().map(|(idx, _)| idx).collect();
}
