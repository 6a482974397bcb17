//! Column metadata and type information

use serde::{Deserialize, Serialize};

/// Declared logical type of a column
///
/// `Text` columns are the only ones the cleaning pipeline promotes; promotion
/// goes one way, to `Numeric` or `Datetime`. `Boolean` only comes from readers
/// with native boolean cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    Text,
    Numeric,
    Datetime,
    Boolean,
}

impl ColumnType {
    pub fn is_text(self) -> bool {
        matches!(self, ColumnType::Text)
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnType::Text => write!(f, "text"),
            ColumnType::Numeric => write!(f, "numeric"),
            ColumnType::Datetime => write!(f, "datetime"),
            ColumnType::Boolean => write!(f, "boolean"),
        }
    }
}

/// Column metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name (from header)
    pub name: String,
    /// Column index (0-based position)
    pub index: usize,
    /// Current declared type
    pub column_type: ColumnType,
}

impl Column {
    /// Create a new text column with name and index
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
            column_type: ColumnType::Text,
        }
    }

    /// Create a column with a specified type
    pub fn with_type(name: impl Into<String>, index: usize, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            index,
            column_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_column_is_text() {
        let col = Column::new("amount", 2);
        assert_eq!(col.column_type, ColumnType::Text);
        assert_eq!(col.index, 2);
    }

    #[test]
    fn test_display() {
        assert_eq!(ColumnType::Numeric.to_string(), "numeric");
        assert_eq!(ColumnType::Datetime.to_string(), "datetime");
    }
}
