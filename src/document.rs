use std::collections::HashMap;
use std::time::SystemTime;

use serde::Serialize;
use uuid::Uuid;

/// A single cell value as decoded from a database table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Number(f64),
    Null,
}

impl Value {
    /// The display form used by the grid, the filter, and mixed-type sorting
    pub fn display(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Null => String::new(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

/// One record; columns without a decoded value are simply absent
pub type Row = HashMap<String, Value>;

/// One named relation within a document. Immutable once constructed:
/// there is no edit feature, so rows and columns never change.
#[derive(Debug, Clone)]
pub struct Table {
    pub id: String,
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Row>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            columns,
            rows,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(column))
    }
}

pub type DocumentId = Uuid;

/// One opened file's in-memory representation
#[derive(Debug, Clone)]
pub struct Document {
    pub id: DocumentId,
    pub file_name: String,
    pub file_size: u64,
    pub last_modified: Option<SystemTime>,
    pub tables: Vec<Table>,
    active_table: Option<String>,
}

impl Document {
    /// The first table (if any) starts out active
    pub fn new(
        file_name: impl Into<String>,
        file_size: u64,
        last_modified: Option<SystemTime>,
        tables: Vec<Table>,
    ) -> Self {
        let active_table = tables.first().map(|t| t.id.clone());
        Self {
            id: Uuid::new_v4(),
            file_name: file_name.into(),
            file_size,
            last_modified,
            tables,
            active_table,
        }
    }

    pub fn table(&self, id: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.id == id)
    }

    pub fn active_table(&self) -> Option<&Table> {
        self.active_table
            .as_deref()
            .and_then(|id| self.table(id))
            .or_else(|| self.tables.first())
    }

    pub fn active_table_id(&self) -> Option<&str> {
        self.active_table.as_deref()
    }

    /// Pointer reassignment; refuses ids that are not in `tables`
    pub fn set_active_table(&mut self, id: &str) -> bool {
        if self.table(id).is_some() {
            self.active_table = Some(id.to_string());
            true
        } else {
            false
        }
    }
}
