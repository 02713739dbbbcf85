//! Table Module
//! Normalized in-memory table shared by file loading, manual entry and charting.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("Column '{column}' has {found} rows, expected {expected}")]
    Shape {
        column: String,
        expected: usize,
        found: usize,
    },
}

/// Declared or inferred column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ColumnType {
    #[default]
    Numeric,
    Object,
}

impl ColumnType {
    pub const ALL: [ColumnType; 2] = [ColumnType::Numeric, ColumnType::Object];

    pub fn label(&self) -> &'static str {
        match self {
            ColumnType::Numeric => "Numeric",
            ColumnType::Object => "Object",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    Number(f64),
    Text(String),
    Null,
}

impl Value {
    /// Numeric view of the cell. Text that parses as a finite number counts.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            Value::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
            Value::Null => Ok(()),
        }
    }
}

/// Named column of cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub dtype: ColumnType,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, dtype: ColumnType, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            dtype,
            values,
        }
    }

    /// Numeric column from plain numbers.
    pub fn numeric(name: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Self {
        Self::new(
            name,
            ColumnType::Numeric,
            values.into_iter().map(Value::Number).collect(),
        )
    }

    /// Text column from plain strings.
    pub fn text<S: Into<String>>(name: impl Into<String>, values: impl IntoIterator<Item = S>) -> Self {
        Self::new(
            name,
            ColumnType::Object,
            values.into_iter().map(|s| Value::Text(s.into())).collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Display strings for every cell, nulls rendered empty.
    pub fn display_values(&self) -> Vec<String> {
        self.values.iter().map(|v| v.to_string()).collect()
    }
}

/// Ordered set of equal-length columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Build a table, rejecting columns whose lengths diverge.
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        if let Some(first) = columns.first() {
            let expected = first.len();
            if let Some(bad) = columns.iter().find(|c| c.len() != expected) {
                return Err(TableError::Shape {
                    column: bad.name.clone(),
                    expected,
                    found: bad.len(),
                });
            }
        }
        Ok(Self { columns })
    }

    pub fn height(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// First column carrying `name`. Names are not required to be unique.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Name and type of every column, in order.
    pub fn dtypes(&self) -> Vec<(String, ColumnType)> {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), c.dtype))
            .collect()
    }

    /// Row-major view of the cells.
    pub fn rows(&self) -> impl Iterator<Item = Vec<&Value>> + '_ {
        (0..self.height()).map(move |i| self.columns.iter().map(|c| &c.values[i]).collect())
    }

    /// First `n` rows rendered as strings, for previews.
    pub fn head(&self, n: usize) -> Vec<Vec<String>> {
        self.rows()
            .take(n)
            .map(|row| row.into_iter().map(|v| v.to_string()).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(vec![
            Column::numeric("A", [1.0, 2.0, 3.0]),
            Column::text("B", ["x", "y", "z"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_table_rejects_ragged_columns() {
        let err = Table::new(vec![
            Column::numeric("A", [1.0, 2.0]),
            Column::text("B", ["x"]),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            TableError::Shape {
                column: "B".to_string(),
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_rows_are_row_major() {
        let table = sample();
        let rows: Vec<Vec<String>> = table
            .rows()
            .map(|r| r.iter().map(|v| v.to_string()).collect())
            .collect();
        assert_eq!(rows[1], vec!["2".to_string(), "y".to_string()]);
        assert_eq!(table.head(2).len(), 2);
    }

    #[test]
    fn test_duplicate_names_resolve_to_first() {
        let table = Table::new(vec![
            Column::numeric("A", [1.0]),
            Column::numeric("A", [9.0]),
        ])
        .unwrap();
        assert_eq!(table.column("A").unwrap().values[0], Value::Number(1.0));
    }

    #[test]
    fn test_value_numeric_view() {
        assert_eq!(Value::Text(" 2.5 ".into()).as_f64(), Some(2.5));
        assert_eq!(Value::Text("abc".into()).as_f64(), None);
        assert_eq!(Value::Text("inf".into()).as_f64(), None);
        assert_eq!(Value::Text("NaN".into()).as_f64(), None);
        assert_eq!(Value::Null.as_f64(), None);
        assert_eq!(Value::Number(3.0).to_string(), "3");
    }

    #[test]
    fn test_dtypes_summary() {
        let dtypes = sample().dtypes();
        assert_eq!(dtypes[0], ("A".to_string(), ColumnType::Numeric));
        assert_eq!(dtypes[1], ("B".to_string(), ColumnType::Object));
    }
}
