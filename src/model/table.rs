//! Table, Row, and Cell data structures

use std::borrow::Cow;
use std::hash::{Hash, Hasher};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::schema::{Column, ColumnType};

/// A cell value with type information
///
/// `Null` is the missing marker. It is distinct from `String("")`, which the
/// cleaning pipeline turns into `Null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(Cow<'static, str>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Null, CellValue::Null) => true,
            (CellValue::Bool(a), CellValue::Bool(b)) => a == b,
            (CellValue::Int(a), CellValue::Int(b)) => a == b,
            (CellValue::Float(a), CellValue::Float(b)) => {
                // Handle NaN comparison
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (CellValue::String(a), CellValue::String(b)) => a == b,
            (CellValue::Date(a), CellValue::Date(b)) => a == b,
            (CellValue::DateTime(a), CellValue::DateTime(b)) => a == b,
            // Cross-type numeric comparison
            (CellValue::Int(a), CellValue::Float(b)) => (*a as f64) == *b,
            (CellValue::Float(a), CellValue::Int(b)) => *a == (*b as f64),
            _ => false,
        }
    }
}

impl Eq for CellValue {}

/// Numeric cells hash through their `f64` bit pattern so that `Int(1)` and
/// `Float(1.0)`, which compare equal, also hash equal.
fn numeric_hash_bits(f: f64) -> u64 {
    if f.is_nan() {
        f64::NAN.to_bits()
    } else if f == 0.0 {
        0.0f64.to_bits()
    } else {
        f.to_bits()
    }
}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            CellValue::Null => 0u8.hash(state),
            CellValue::Bool(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            CellValue::Int(i) => {
                2u8.hash(state);
                numeric_hash_bits(*i as f64).hash(state);
            }
            CellValue::Float(f) => {
                2u8.hash(state);
                numeric_hash_bits(*f).hash(state);
            }
            CellValue::String(s) => {
                3u8.hash(state);
                s.hash(state);
            }
            CellValue::Date(d) => {
                4u8.hash(state);
                d.hash(state);
            }
            CellValue::DateTime(dt) => {
                5u8.hash(state);
                dt.hash(state);
            }
        }
    }
}

impl CellValue {
    /// Check if the value is the missing marker
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// A string cell made only of whitespace (or empty)
    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::String(s) if s.trim().is_empty())
    }

    /// Convert to a display string
    pub fn display(&self) -> Cow<'_, str> {
        match self {
            CellValue::Null => Cow::Borrowed("<NA>"),
            CellValue::Bool(b) => Cow::Owned(b.to_string()),
            CellValue::Int(i) => Cow::Owned(i.to_string()),
            CellValue::Float(f) => Cow::Owned(f.to_string()),
            CellValue::String(s) => Cow::Borrowed(s.as_ref()),
            CellValue::Date(d) => Cow::Owned(d.to_string()),
            CellValue::DateTime(dt) => Cow::Owned(dt.to_string()),
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(Cow::Owned(s.to_string()))
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(Cow::Owned(s))
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        if f.is_nan() {
            CellValue::Null
        } else {
            CellValue::Float(f)
        }
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::DateTime(dt)
    }
}

impl<T> From<Option<T>> for CellValue
where
    T: Into<CellValue>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Null,
        }
    }
}

/// A row in the table
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Cell values in column order
    pub cells: Vec<CellValue>,
    /// Original line/record number in source file (1-indexed)
    pub source_line: usize,
}

impl Row {
    pub fn new(cells: Vec<CellValue>, source_line: usize) -> Self {
        Self { cells, source_line }
    }

    /// Get a cell value by column index
    pub fn get(&self, index: usize) -> Option<&CellValue> {
        self.cells.get(index)
    }
}

/// A table containing columns and rows
///
/// Rows are positional: a row's index is its position in `rows`, so indices
/// stay dense and 0-based whenever rows are removed.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Column definitions
    pub columns: Vec<Column>,
    /// All rows in the table
    pub rows: Vec<Row>,
}

impl Table {
    /// Create a new empty table with column definitions
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from header names and string cells, every column typed
    /// as text. Empty strings are kept as-is.
    pub fn from_strings<S: AsRef<str>>(headers: &[S], rows: &[Vec<S>]) -> Self {
        let columns = headers
            .iter()
            .enumerate()
            .map(|(i, name)| Column::new(name.as_ref(), i))
            .collect();
        let mut table = Table::new(columns);
        for (line_num, row) in rows.iter().enumerate() {
            let cells = row.iter().map(|s| CellValue::from(s.as_ref())).collect();
            table.add_row(cells, line_num + 2);
        }
        table
    }

    /// Add a row to the table, padding short rows with nulls
    pub fn add_row(&mut self, mut cells: Vec<CellValue>, source_line: usize) {
        if cells.len() < self.columns.len() {
            cells.resize(self.columns.len(), CellValue::Null);
        }
        cells.truncate(self.columns.len());
        self.rows.push(Row::new(cells, source_line));
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Iterate the cells of one column in row order
    pub fn column_cells(&self, col_idx: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows.iter().filter_map(move |row| row.get(col_idx))
    }

    /// Count the non-missing cells of a column
    pub fn non_null_count(&self, col_idx: usize) -> usize {
        self.column_cells(col_idx).filter(|c| !c.is_null()).count()
    }

    /// Replace every cell of a column and set its declared type
    ///
    /// `cells` must hold exactly one value per row.
    pub fn replace_column(&mut self, col_idx: usize, cells: Vec<CellValue>, column_type: ColumnType) {
        debug_assert_eq!(cells.len(), self.rows.len());
        for (row, cell) in self.rows.iter_mut().zip(cells) {
            if let Some(slot) = row.cells.get_mut(col_idx) {
                *slot = cell;
            }
        }
        if let Some(col) = self.columns.get_mut(col_idx) {
            col.column_type = column_type;
        }
    }

    /// Keep only the columns whose flag in `keep` is true, preserving order
    /// and re-numbering column indices.
    pub fn retain_columns(&mut self, keep: &[bool]) {
        let is_kept = |i: usize| keep.get(i).copied().unwrap_or(true);

        for row in &mut self.rows {
            let mut i = 0;
            row.cells.retain(|_| {
                let kept = is_kept(i);
                i += 1;
                kept
            });
        }

        let mut i = 0;
        self.columns.retain(|_| {
            let kept = is_kept(i);
            i += 1;
            kept
        });
        for (idx, col) in self.columns.iter_mut().enumerate() {
            col.index = idx;
        }
    }
}
