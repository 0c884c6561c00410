//! Sort directive and value comparison for the derived view

use std::cmp::Ordering;

use crate::document::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// The (column, direction) pair currently applied to a table's view.
/// No column means unsorted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortSpec {
    pub column: Option<String>,
    pub direction: Option<SortDirection>,
}

impl SortSpec {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.column.is_some() && self.direction.is_some()
    }

    pub fn clear(&mut self) {
        self.column = None;
        self.direction = None;
    }

    /// Header-click state machine: the same column cycles
    /// ascending -> descending -> unsorted, any other column starts
    /// over at ascending.
    pub fn cycle(&mut self, column: &str) {
        if self.column.as_deref() == Some(column) {
            match self.direction {
                Some(SortDirection::Ascending) => {
                    self.direction = Some(SortDirection::Descending);
                }
                _ => self.clear(),
            }
        } else {
            self.column = Some(column.to_string());
            self.direction = Some(SortDirection::Ascending);
        }
    }
}

/// Sort key extracted from a cell. `None` stands for a missing or null
/// cell, which orders after every defined value regardless of direction.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SortKey {
    Number(f64),
    Text(String),
}

pub(crate) fn sort_key(value: Option<&Value>) -> Option<SortKey> {
    match value {
        Some(Value::Number(n)) if !n.is_nan() => Some(SortKey::Number(*n)),
        Some(Value::Text(s)) => Some(SortKey::Text(s.clone())),
        _ => None,
    }
}

/// Numbers compare numerically against numbers; everything else falls
/// back to the display form, matching the grid's stringified ordering.
pub(crate) fn compare_keys(a: &SortKey, b: &SortKey) -> Ordering {
    match (a, b) {
        (SortKey::Number(x), SortKey::Number(y)) => {
            x.partial_cmp(y).unwrap_or(Ordering::Equal)
        }
        (SortKey::Text(x), SortKey::Text(y)) => x.cmp(y),
        (SortKey::Number(x), SortKey::Text(y)) => x.to_string().as_str().cmp(y),
        (SortKey::Text(x), SortKey::Number(y)) => x.as_str().cmp(y.to_string().as_str()),
    }
}
