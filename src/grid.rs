//! Grid presentation state: column widths, the drag-resize gesture and
//! the viewport cursor. Row content itself is a pure projection of the
//! derived view; nothing here owns row data.

use std::collections::HashMap;

use crate::document::Table;
use crate::view::SortSpec;

pub const DEFAULT_COLUMN_WIDTH: u16 = 16;
pub const MIN_COLUMN_WIDTH: u16 = 5;

/// Per-column widths in terminal cells. Reinitialized whenever the
/// active table changes.
#[derive(Debug, Default)]
pub struct ColumnWidths {
    widths: HashMap<String, u16>,
}

impl ColumnWidths {
    pub fn reset(&mut self, columns: &[String]) {
        self.widths = columns
            .iter()
            .map(|c| (c.clone(), DEFAULT_COLUMN_WIDTH))
            .collect();
    }

    pub fn get(&self, column: &str) -> u16 {
        self.widths
            .get(column)
            .copied()
            .unwrap_or(DEFAULT_COLUMN_WIDTH)
    }

    pub fn set(&mut self, column: &str, width: u16) {
        self.widths
            .insert(column.to_string(), width.max(MIN_COLUMN_WIDTH));
    }
}

/// A live column-resize capture. Exists only between mouse-down on a
/// column boundary and the gesture-ending event; dropping it is the
/// release.
#[derive(Debug, Clone)]
struct ResizeGesture {
    column: String,
    start_x: u16,
    start_width: u16,
}

#[derive(Debug, Default)]
pub struct GridState {
    pub widths: ColumnWidths,
    pub sort: SortSpec,
    pub filter: String,
    gesture: Option<ResizeGesture>,
    pub cursor_row: usize,
    pub cursor_col: usize,
    pub viewport_row: usize,
    pub viewport_col: usize,
    /// Set during render from the actual grid area
    pub viewport_height: usize,
    /// Columns that fit on screen, set during render
    pub visible_cols: usize,
}

impl GridState {
    pub fn new() -> Self {
        Self {
            viewport_height: 20,
            visible_cols: 1,
            ..Self::default()
        }
    }

    /// A table became active: widths go back to the default, the sort
    /// directive resets and any live gesture is released. The filter
    /// text survives the switch.
    pub fn activate_table(&mut self, table: &Table) {
        self.widths.reset(&table.columns);
        self.sort.clear();
        self.gesture = None;
        self.cursor_row = 0;
        self.cursor_col = 0;
        self.viewport_row = 0;
        self.viewport_col = 0;
    }

    // --- Resize gesture ---

    /// Starting a new gesture implicitly ends any prior one
    pub fn begin_resize(&mut self, column: &str, x: u16) {
        self.gesture = Some(ResizeGesture {
            column: column.to_string(),
            start_x: x,
            start_width: self.widths.get(column),
        });
    }

    pub fn drag_resize(&mut self, x: u16) {
        if let Some(gesture) = &self.gesture {
            let delta = x as i32 - gesture.start_x as i32;
            let width = (gesture.start_width as i32 + delta).max(MIN_COLUMN_WIDTH as i32);
            let column = gesture.column.clone();
            self.widths.set(&column, width as u16);
        }
    }

    pub fn end_resize(&mut self) {
        self.gesture = None;
    }

    pub fn is_resizing(&self) -> bool {
        self.gesture.is_some()
    }

    // --- Cursor / viewport, clamped to the derived view ---

    pub fn clamp(&mut self, view_len: usize, col_count: usize) {
        if view_len == 0 {
            self.cursor_row = 0;
            self.viewport_row = 0;
        } else {
            self.cursor_row = self.cursor_row.min(view_len - 1);
        }
        if col_count == 0 {
            self.cursor_col = 0;
            self.viewport_col = 0;
        } else {
            self.cursor_col = self.cursor_col.min(col_count - 1);
            self.viewport_col = self.viewport_col.min(col_count - 1);
        }
        self.scroll_to_cursor();
    }

    pub fn move_up(&mut self, n: usize) {
        self.cursor_row = self.cursor_row.saturating_sub(n);
        self.scroll_to_cursor();
    }

    pub fn move_down(&mut self, n: usize, view_len: usize) {
        if view_len > 0 {
            self.cursor_row = (self.cursor_row + n).min(view_len - 1);
        }
        self.scroll_to_cursor();
    }

    pub fn move_left(&mut self) {
        self.cursor_col = self.cursor_col.saturating_sub(1);
        if self.cursor_col < self.viewport_col {
            self.viewport_col = self.cursor_col;
        }
    }

    pub fn move_right(&mut self, col_count: usize) {
        if col_count > 0 && self.cursor_col + 1 < col_count {
            self.cursor_col += 1;
            if self.cursor_col >= self.viewport_col + self.visible_cols.max(1) {
                self.viewport_col += 1;
            }
        }
    }

    pub fn move_to_top(&mut self) {
        self.cursor_row = 0;
        self.scroll_to_cursor();
    }

    pub fn move_to_bottom(&mut self, view_len: usize) {
        self.cursor_row = view_len.saturating_sub(1);
        self.scroll_to_cursor();
    }

    pub fn page_up(&mut self) {
        self.move_up(self.viewport_height.saturating_sub(1).max(1));
    }

    pub fn page_down(&mut self, view_len: usize) {
        self.move_down(self.viewport_height.saturating_sub(1).max(1), view_len);
    }

    pub fn scroll_to_cursor(&mut self) {
        if self.cursor_row < self.viewport_row {
            self.viewport_row = self.cursor_row;
        } else if self.viewport_height > 0
            && self.cursor_row >= self.viewport_row + self.viewport_height
        {
            self.viewport_row = self.cursor_row - self.viewport_height + 1;
        }
    }
}
