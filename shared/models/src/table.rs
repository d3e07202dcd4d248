//! Raw tabular input models.
//!
//! These types describe spreadsheet data before normalization: a workbook is a
//! sequence of named tables, each holding rows that are either positional
//! (one string per column) or named (column header to cell value).

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Reference to a single column of a raw row.
///
/// Deserializes from either a number (zero-based position) or a string
/// (column name), so configuration files can write `quantity = [6, 7, 5]`
/// or `quantity = ["stock", "qty"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Index(usize),
    Name(String),
}

impl ColumnRef {
    pub fn index(index: usize) -> Self {
        Self::Index(index)
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "#{}", index),
            Self::Name(name) => write!(f, "{}", name),
        }
    }
}

/// One raw row of a table.
///
/// Deserializes from a JSON array or object whose cells may be strings,
/// numbers, booleans or null; every cell is stored as the text a spreadsheet
/// would show for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RawRow {
    Positional(Vec<String>),
    Named(HashMap<String, String>),
}

impl<'de> Deserialize<'de> for RawRow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Cells {
            Positional(Vec<CellText>),
            Named(HashMap<String, CellText>),
        }

        Ok(match Cells::deserialize(deserializer)? {
            Cells::Positional(cells) => Self::Positional(cells.into_iter().map(|c| c.0).collect()),
            Cells::Named(cells) => Self::Named(cells.into_iter().map(|(k, v)| (k, v.0)).collect()),
        })
    }
}

/// A scalar cell rendered to text. Whole floats drop their fraction and
/// null becomes an empty cell.
struct CellText(String);

impl<'de> Deserialize<'de> for CellText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(CellTextVisitor)
    }
}

struct CellTextVisitor;

impl<'de> Visitor<'de> for CellTextVisitor {
    type Value = CellText;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, number, boolean or null cell")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<CellText, E> {
        Ok(CellText(value.to_string()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<CellText, E> {
        Ok(CellText(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<CellText, E> {
        Ok(CellText(value.to_string()))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<CellText, E> {
        Ok(CellText(value.to_string()))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<CellText, E> {
        Ok(CellText(render_float(value)))
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<CellText, E> {
        Ok(CellText(value.to_string()))
    }

    fn visit_unit<E: de::Error>(self) -> Result<CellText, E> {
        Ok(CellText(String::new()))
    }

    fn visit_none<E: de::Error>(self) -> Result<CellText, E> {
        Ok(CellText(String::new()))
    }
}

/// Render a float the way a spreadsheet shows it: `1500.0` becomes `"1500"`.
pub fn render_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        (value as i64).to_string()
    } else {
        value.to_string()
    }
}

impl RawRow {
    /// Look up a cell. Positional rows only answer index references and named
    /// rows only answer name references; anything else is absent.
    pub fn get(&self, column: &ColumnRef) -> Option<&str> {
        match (self, column) {
            (Self::Positional(cells), ColumnRef::Index(index)) => {
                cells.get(*index).map(String::as_str)
            }
            (Self::Named(cells), ColumnRef::Name(name)) => cells.get(name).map(String::as_str),
            _ => None,
        }
    }
}

impl From<Vec<String>> for RawRow {
    fn from(cells: Vec<String>) -> Self {
        Self::Positional(cells)
    }
}

impl From<Vec<&str>> for RawRow {
    fn from(cells: Vec<&str>) -> Self {
        Self::Positional(cells.into_iter().map(str::to_string).collect())
    }
}

impl From<HashMap<String, String>> for RawRow {
    fn from(cells: HashMap<String, String>) -> Self {
        Self::Named(cells)
    }
}

/// A named table (spreadsheet sheet) of raw rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    pub name: String,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn new(name: impl Into<String>, rows: Vec<RawRow>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}
