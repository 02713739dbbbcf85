//! Heatmap pivot: distinct X keys become rows, distinct Y keys become
//! columns, and each table row fills one cell.

use crate::charts::dispatcher::{numeric_values, ChartError};
use crate::charts::figure::HeatmapGrid;
use crate::data::{Column, Value};
use std::cmp::Ordering;

/// Distinct non-null keys, sorted numerically when every key is a number.
fn distinct_sorted(column: &Column) -> Vec<Value> {
    let mut keys: Vec<Value> = Vec::new();
    for value in column.values.iter().filter(|v| !v.is_null()) {
        if !keys.iter().any(|k| k.to_string() == value.to_string()) {
            keys.push(value.clone());
        }
    }

    let all_numeric = keys.iter().all(|k| k.as_f64().is_some());
    if all_numeric {
        keys.sort_by(|a, b| {
            let (a, b) = (a.as_f64().unwrap_or(f64::NAN), b.as_f64().unwrap_or(f64::NAN));
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        });
    } else {
        keys.sort_by_key(|k| k.to_string());
    }
    keys
}

fn key_index(keys: &[String], value: &Value) -> Option<usize> {
    if value.is_null() {
        return None;
    }
    let label = value.to_string();
    keys.iter().position(|k| *k == label)
}

/// Pivot `values` into a grid keyed by `rows` x `cols`.
///
/// Passing the Y column as both `cols` and `values` reproduces the
/// self-pivot the form has always drawn. A (row, column) pair seen twice
/// cannot be reshaped and fails.
pub fn pivot(rows: &Column, cols: &Column, values: &Column) -> Result<HeatmapGrid, ChartError> {
    for other in [cols, values] {
        if other.len() != rows.len() {
            return Err(ChartError::Shape {
                x: rows.name.clone(),
                x_len: rows.len(),
                y: other.name.clone(),
                y_len: other.len(),
            });
        }
    }

    let cell_values = numeric_values(values)?;

    let row_keys: Vec<String> = distinct_sorted(rows).iter().map(Value::to_string).collect();
    let col_keys: Vec<String> = distinct_sorted(cols).iter().map(Value::to_string).collect();

    let mut cells = vec![vec![None; col_keys.len()]; row_keys.len()];
    let mut filled = vec![vec![false; col_keys.len()]; row_keys.len()];

    for (i, value) in cell_values.into_iter().enumerate() {
        let (Some(r), Some(c)) = (
            key_index(&row_keys, &rows.values[i]),
            key_index(&col_keys, &cols.values[i]),
        ) else {
            continue;
        };

        if filled[r][c] {
            return Err(ChartError::DuplicateEntry {
                row: row_keys[r].clone(),
                column: col_keys[c].clone(),
            });
        }
        filled[r][c] = true;
        cells[r][c] = value;
    }

    Ok(HeatmapGrid {
        row_keys,
        col_keys,
        cells,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_pivot_places_y_on_its_own_column() {
        let x = Column::text("day", ["mon", "tue", "wed"]);
        let y = Column::numeric("temp", [20.0, 18.0, 25.0]);
        let grid = pivot(&x, &y, &y).unwrap();

        assert_eq!(grid.row_keys, vec!["mon", "tue", "wed"]);
        assert_eq!(grid.col_keys, vec!["18", "20", "25"]);
        assert_eq!(grid.get(0, 1), Some(20.0));
        assert_eq!(grid.get(1, 0), Some(18.0));
        assert_eq!(grid.get(2, 2), Some(25.0));
        assert_eq!(grid.get(0, 0), None);
    }

    #[test]
    fn test_three_column_pivot() {
        let x = Column::text("row", ["a", "a", "b", "b"]);
        let y = Column::text("col", ["p", "q", "p", "q"]);
        let v = Column::numeric("v", [1.0, 2.0, 3.0, 4.0]);
        let grid = pivot(&x, &y, &v).unwrap();
        assert_eq!(grid.cells, vec![vec![Some(1.0), Some(2.0)], vec![Some(3.0), Some(4.0)]]);
    }

    #[test]
    fn test_numeric_keys_sort_numerically() {
        let x = Column::numeric("n", [10.0, 9.0, 100.0]);
        let y = Column::numeric("m", [1.0, 2.0, 3.0]);
        let grid = pivot(&x, &y, &y).unwrap();
        assert_eq!(grid.row_keys, vec!["9", "10", "100"]);
    }

    #[test]
    fn test_duplicate_pair_cannot_reshape() {
        let x = Column::text("row", ["a", "a"]);
        let y = Column::numeric("v", [1.0, 1.0]);
        assert_eq!(
            pivot(&x, &y, &y).unwrap_err(),
            ChartError::DuplicateEntry {
                row: "a".into(),
                column: "1".into()
            }
        );
    }

    #[test]
    fn test_uneven_columns_are_a_shape_error() {
        let x = Column::text("row", ["a", "b", "c"]);
        let y = Column::numeric("v", [1.0, 2.0]);
        assert_eq!(
            pivot(&x, &y, &y).unwrap_err(),
            ChartError::Shape {
                x: "row".into(),
                x_len: 3,
                y: "v".into(),
                y_len: 2
            }
        );
    }

    #[test]
    fn test_text_cells_are_rejected() {
        let x = Column::text("row", ["a"]);
        let y = Column::text("label", ["hot"]);
        assert!(matches!(
            pivot(&x, &y, &y),
            Err(ChartError::InvalidValues { .. })
        ));
    }
}
