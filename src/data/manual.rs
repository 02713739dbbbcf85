//! Manual Entry Module
//! Grid of hand-typed cells that builds into a `Table`.

use crate::data::loader::{CellIssue, ParseError};
use crate::data::table::{Column, ColumnType, Table, Value};

/// One hand-entered column: name, declared type and the raw cell strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManualColumn {
    pub name: String,
    pub dtype: ColumnType,
    pub cells: Vec<String>,
}

/// Rows x columns of raw strings typed by the user.
///
/// Cells are entered column by column; `build` transposes them into the
/// table layout. Each column is named exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct ManualGrid {
    rows: usize,
    columns: Vec<ManualColumn>,
}

impl Default for ManualGrid {
    fn default() -> Self {
        Self {
            rows: 1,
            columns: vec![ManualColumn {
                cells: vec![String::new()],
                ..Default::default()
            }],
        }
    }
}

impl ManualGrid {
    /// Empty grid of `rows` x `cols`. Both must be at least 1.
    pub fn new(rows: usize, cols: usize) -> Result<Self, ParseError> {
        let mut grid = Self::default();
        grid.resize(rows, cols)?;
        Ok(grid)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[ManualColumn] {
        &self.columns
    }

    pub fn columns_mut(&mut self) -> &mut [ManualColumn] {
        &mut self.columns
    }

    /// Change the grid dimensions, keeping whatever was already typed.
    pub fn resize(&mut self, rows: usize, cols: usize) -> Result<(), ParseError> {
        if rows == 0 || cols == 0 {
            return Err(ParseError::InvalidGrid(format!(
                "need at least one row and one column, got {} x {}",
                rows, cols
            )));
        }

        self.rows = rows;
        self.columns.resize_with(cols, ManualColumn::default);
        for column in &mut self.columns {
            column.cells.resize(rows, String::new());
        }
        Ok(())
    }

    pub fn set_name(&mut self, col: usize, name: impl Into<String>) {
        if let Some(column) = self.columns.get_mut(col) {
            column.name = name.into();
        }
    }

    pub fn set_type(&mut self, col: usize, dtype: ColumnType) {
        if let Some(column) = self.columns.get_mut(col) {
            column.dtype = dtype;
        }
    }

    pub fn set_cell(&mut self, row: usize, col: usize, value: impl Into<String>) {
        if let Some(cell) = self
            .columns
            .get_mut(col)
            .and_then(|c| c.cells.get_mut(row))
        {
            *cell = value.into();
        }
    }

    /// Name a column ends up with; blank names fall back to `Column N`.
    pub fn resolved_name(&self, col: usize) -> String {
        match self.columns.get(col) {
            Some(c) if !c.name.trim().is_empty() => c.name.trim().to_string(),
            _ => format!("Column {}", col + 1),
        }
    }

    /// Build the table. Numeric columns are coerced cell by cell; blank
    /// cells become nulls and every unparsable cell is reported at once.
    pub fn build(&self) -> Result<Table, ParseError> {
        let mut issues = Vec::new();
        let mut columns = Vec::with_capacity(self.columns.len());

        for (idx, manual) in self.columns.iter().enumerate() {
            let name = self.resolved_name(idx);
            let values = manual
                .cells
                .iter()
                .enumerate()
                .map(|(row, raw)| match manual.dtype {
                    ColumnType::Numeric => {
                        let trimmed = raw.trim();
                        if trimmed.is_empty() {
                            Value::Null
                        } else if let Some(n) =
                            trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
                        {
                            Value::Number(n)
                        } else {
                            issues.push(CellIssue {
                                row: row + 1,
                                column: name.clone(),
                                value: raw.clone(),
                            });
                            Value::Null
                        }
                    }
                    ColumnType::Object => Value::Text(raw.clone()),
                })
                .collect();
            columns.push(Column::new(name, manual.dtype, values));
        }

        if !issues.is_empty() {
            return Err(ParseError::InvalidCells(issues));
        }

        Ok(Table::new(columns)?)
    }
}
