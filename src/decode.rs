//! The decoder seam between file intake and the workspace
//!
//! The viewer depends only on the `TableDecoder` trait; swapping in a
//! real Jet/ACE format reader means implementing `decode` and handing
//! it to the intake. The shipped `PlaceholderDecoder` fabricates the
//! demo tables instead of parsing the binary payload.

use rand::Rng;
use thiserror::Error;

use crate::document::{Row, Table, Value};

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("file is empty")]
    Empty,
    #[error("file is truncated: {0}")]
    Truncated(String),
    #[error("unsupported database layout: {0}")]
    Unsupported(String),
}

pub trait TableDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<Vec<Table>, DecodeError>;
}

/// Stand-in decoder producing a fixed pair of demo tables
pub struct PlaceholderDecoder;

const PRODUCTS: [&str; 5] = [
    "Office Chair",
    "Desk Lamp",
    "Monitor Stand",
    "Keyboard Tray",
    "Cable Manager",
];
const VENDOR_SUFFIXES: [&str; 5] = ["A", "B", "C", "D", "E"];
const EMPLOYEE_NAMES: [&str; 5] = [
    "Alex Rivera",
    "Jordan Smith",
    "Sam Taylor",
    "Casey Morgan",
    "Taylor Lee",
];
const DEPARTMENTS: [&str; 5] = ["Engineering", "Sales", "HR", "Legal", "Marketing"];
const ROLES: [&str; 5] = ["Senior", "Junior", "Manager", "Director", "Lead"];

impl TableDecoder for PlaceholderDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Vec<Table>, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }
        Ok(vec![inventory_table(), employees_table()])
    }
}

fn inventory_table() -> Table {
    let columns: Vec<String> = [
        "SKU",
        "ProductName",
        "Category",
        "StockLevel",
        "UnitPrice",
        "Supplier",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect();

    let mut rng = rand::thread_rng();
    let rows = (0..40)
        .map(|i| {
            let price: f64 = rng.gen_range(20.0..220.0);
            let mut row = Row::new();
            row.insert("SKU".into(), Value::Text(format!("SKU-{}", 1000 + i)));
            row.insert("ProductName".into(), Value::from(PRODUCTS[i % 5]));
            row.insert("Category".into(), Value::from("Office Furniture"));
            row.insert(
                "StockLevel".into(),
                Value::Number(rng.gen_range(0..100) as f64),
            );
            row.insert("UnitPrice".into(), Value::Text(format!("${:.2}", price)));
            row.insert(
                "Supplier".into(),
                Value::Text(format!("Vendor {}", VENDOR_SUFFIXES[i % 5])),
            );
            row
        })
        .collect();

    Table::new("tbl_inventory", "Inventory", columns, rows)
}

fn employees_table() -> Table {
    let columns: Vec<String> = ["EmpID", "FullName", "Department", "Role", "HireDate", "Status"]
        .iter()
        .map(|c| c.to_string())
        .collect();

    let rows = (0..15)
        .map(|i| {
            let mut row = Row::new();
            row.insert("EmpID".into(), Value::Number((100 + i) as f64));
            row.insert("FullName".into(), Value::from(EMPLOYEE_NAMES[i % 5]));
            row.insert("Department".into(), Value::from(DEPARTMENTS[i % 5]));
            row.insert("Role".into(), Value::from(ROLES[i % 5]));
            row.insert("HireDate".into(), Value::from("2022-03-15"));
            row.insert("Status".into(), Value::from("Active"));
            row
        })
        .collect();

    Table::new("tbl_employees", "Employees", columns, rows)
}
