//! File Loader Module
//! Turns uploaded CSV or spreadsheet bytes into a `Table`.
//! CSV goes through Polars, workbooks through calamine.

use crate::data::table::{Column, ColumnType, Table, TableError, Value};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Rows Polars looks at before settling on a column type.
const INFER_SCHEMA_ROWS: usize = 10_000;

static EMPTY_CELL: Data = Data::Empty;

/// A manual-entry cell that failed numeric coercion (1-based positions).
#[derive(Debug, Clone, PartialEq)]
pub struct CellIssue {
    pub row: usize,
    pub column: String,
    pub value: String,
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error("Failed to read spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error("Unsupported file type: '{0}' (expected csv, xlsx or xls)")]
    UnsupportedKind(String),
    #[error("The file contains no data")]
    Empty,
    #[error("Malformed CSV at line {line}: expected {expected} fields, found {found}")]
    Ragged {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("Malformed CSV: {0}")]
    Records(#[from] csv::Error),
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),
    #[error("Invalid numeric values: {}", describe_cells(.0))]
    InvalidCells(Vec<CellIssue>),
    #[error(transparent)]
    Shape(#[from] TableError),
}

fn describe_cells(cells: &[CellIssue]) -> String {
    cells
        .iter()
        .map(|c| format!("'{}' at row {} in column '{}'", c.value, c.row, c.column))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Kind of uploaded artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Spreadsheet,
}

impl FileKind {
    /// File extensions offered by the upload dialog.
    pub const EXTENSIONS: [&'static str; 3] = ["csv", "xlsx", "xls"];

    /// Resolve the kind from an uploaded file name.
    pub fn from_file_name(name: &str) -> Result<Self, ParseError> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => Ok(FileKind::Csv),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Ok(FileKind::Spreadsheet),
            _ => Err(ParseError::UnsupportedKind(name.to_string())),
        }
    }
}

/// Parses uploaded files into tables.
pub struct DataLoader;

impl DataLoader {
    /// Parse `bytes` according to `kind`.
    pub fn load_bytes(kind: FileKind, bytes: &[u8]) -> Result<Table, ParseError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(ParseError::Empty);
        }

        let table = match kind {
            FileKind::Csv => Self::load_csv(bytes)?,
            FileKind::Spreadsheet => Self::load_spreadsheet(bytes)?,
        };

        debug!(
            rows = table.height(),
            columns = table.width(),
            ?kind,
            "parsed uploaded file"
        );
        Ok(table)
    }

    /// Parse an upload, picking the kind from its file name.
    pub fn load_named(file_name: &str, bytes: &[u8]) -> Result<Table, ParseError> {
        let kind = FileKind::from_file_name(file_name)?;
        Self::load_bytes(kind, bytes)
    }

    /// Every record must have as many fields as the header. Polars pads
    /// short rows with nulls, so truncated uploads are caught here.
    fn check_records(bytes: &[u8]) -> Result<(), ParseError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(bytes);

        for record in reader.byte_records() {
            let Err(e) = record else { continue };
            if let csv::ErrorKind::UnequalLengths {
                pos,
                expected_len,
                len,
            } = e.kind()
            {
                return Err(ParseError::Ragged {
                    line: pos.as_ref().map_or(0, |p| p.line() as usize),
                    expected: *expected_len as usize,
                    found: *len as usize,
                });
            }
            return Err(ParseError::Records(e));
        }
        Ok(())
    }

    fn load_csv(bytes: &[u8]) -> Result<Table, ParseError> {
        Self::check_records(bytes)?;

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
            .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
            .finish()?;

        if df.width() == 0 {
            return Err(ParseError::Empty);
        }

        let columns = df
            .get_columns()
            .iter()
            .map(|col| Self::convert_column(col.as_materialized_series()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Table::new(columns)?)
    }

    fn convert_column(series: &Series) -> Result<Column, PolarsError> {
        let name = series.name().to_string();

        if Self::is_numeric(series.dtype()) {
            let as_f64 = series.cast(&DataType::Float64)?;
            let values = as_f64
                .f64()?
                .into_iter()
                .map(|v| v.map(Value::Number).unwrap_or(Value::Null))
                .collect();
            Ok(Column::new(name, ColumnType::Numeric, values))
        } else {
            let as_str = series.cast(&DataType::String)?;
            let values = as_str
                .str()?
                .into_iter()
                .map(|v| v.map(|s| Value::Text(s.to_string())).unwrap_or(Value::Null))
                .collect();
            Ok(Column::new(name, ColumnType::Object, values))
        }
    }

    fn is_numeric(dtype: &DataType) -> bool {
        matches!(
            dtype,
            DataType::Float32
                | DataType::Float64
                | DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
        )
    }

    fn load_spreadsheet(bytes: &[u8]) -> Result<Table, ParseError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
        let range = workbook.worksheet_range_at(0).ok_or(ParseError::Empty)??;

        let mut rows = range.rows();
        let header = rows.next().ok_or(ParseError::Empty)?;
        let body: Vec<&[Data]> = rows.collect();

        let columns: Vec<Column> = header
            .iter()
            .enumerate()
            .map(|(idx, head)| {
                let name = match head {
                    Data::Empty => format!("Unnamed: {}", idx),
                    other => other.to_string(),
                };
                let cells: Vec<&Data> = body
                    .iter()
                    .map(|row| row.get(idx).unwrap_or(&EMPTY_CELL))
                    .collect();
                Self::convert_cells(name, &cells)
            })
            .collect();

        Ok(Table::new(columns)?)
    }

    fn convert_cells(name: String, cells: &[&Data]) -> Column {
        let numeric = cells.iter().all(|cell| {
            matches!(cell, Data::Int(_) | Data::Float(_) | Data::Empty)
        }) && cells.iter().any(|cell| !matches!(cell, Data::Empty));

        let values = cells
            .iter()
            .map(|cell| match cell {
                Data::Empty => Value::Null,
                Data::Int(i) if numeric => Value::Number(*i as f64),
                Data::Float(f) if numeric => Value::Number(*f),
                Data::String(s) => Value::Text(s.clone()),
                other => Value::Text(other.to_string()),
            })
            .collect();

        let dtype = if numeric {
            ColumnType::Numeric
        } else {
            ColumnType::Object
        };
        Column::new(name, dtype, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kind_from_name() {
        assert_eq!(FileKind::from_file_name("data.CSV").unwrap(), FileKind::Csv);
        assert_eq!(
            FileKind::from_file_name("book.xlsx").unwrap(),
            FileKind::Spreadsheet
        );
        assert_eq!(
            FileKind::from_file_name("old.xls").unwrap(),
            FileKind::Spreadsheet
        );
        assert!(matches!(
            FileKind::from_file_name("notes.txt"),
            Err(ParseError::UnsupportedKind(_))
        ));
        assert!(matches!(
            FileKind::from_file_name("no_extension"),
            Err(ParseError::UnsupportedKind(_))
        ));
    }

    #[test]
    fn test_csv_preserves_names_and_infers_types() {
        let csv = b"month,sales,region\nJan,10,north\nFeb,12.5,south\nMar,9,east\n";
        let table = DataLoader::load_bytes(FileKind::Csv, csv).unwrap();

        assert_eq!(table.column_names(), vec!["month", "sales", "region"]);
        assert_eq!(table.height(), 3);

        let sales = table.column("sales").unwrap();
        assert_eq!(sales.dtype, ColumnType::Numeric);
        assert_eq!(
            sales.values,
            vec![Value::Number(10.0), Value::Number(12.5), Value::Number(9.0)]
        );

        let month = table.column("month").unwrap();
        assert_eq!(month.dtype, ColumnType::Object);
        assert_eq!(month.display_values(), vec!["Jan", "Feb", "Mar"]);
    }

    #[test]
    fn test_csv_missing_cells_become_null() {
        let csv = b"a,b\n1,\n2,x\n";
        let table = DataLoader::load_bytes(FileKind::Csv, csv).unwrap();
        assert_eq!(table.column("b").unwrap().values[0], Value::Null);
    }

    #[test]
    fn test_empty_upload_is_parse_error() {
        assert!(matches!(
            DataLoader::load_bytes(FileKind::Csv, b""),
            Err(ParseError::Empty)
        ));
        assert!(matches!(
            DataLoader::load_bytes(FileKind::Spreadsheet, b"  \n"),
            Err(ParseError::Empty)
        ));
    }

    #[test]
    fn test_ragged_csv_is_parse_error() {
        let csv = b"a,b\n1,2\n3,4,5,6\n";
        assert!(DataLoader::load_bytes(FileKind::Csv, csv).is_err());
    }

    #[test]
    fn test_truncated_csv_reports_line() {
        let csv = b"a,b,c\n1,2,3\n4,5";
        assert!(matches!(
            DataLoader::load_bytes(FileKind::Csv, csv),
            Err(ParseError::Ragged {
                line: 3,
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn test_quoted_commas_and_crlf() {
        let csv = b"name,n\r\n\"Smith, J\",4\r\n";
        let table = DataLoader::load_bytes(FileKind::Csv, csv).unwrap();
        assert_eq!(table.height(), 1);
        assert_eq!(table.column("name").unwrap().values, vec![Value::Text("Smith, J".into())]);
    }

    #[test]
    fn test_quote_inside_field_is_literal() {
        let csv = b"name,height\nBob,5'11\"\nAl,6\n";
        let table = DataLoader::load_bytes(FileKind::Csv, csv).unwrap();
        assert_eq!(table.height(), 2);
        assert_eq!(
            table.column("height").unwrap().values,
            vec![Value::Text("5'11\"".into()), Value::Text("6".into())]
        );
    }

    #[test]
    fn test_garbage_workbook_is_parse_error() {
        let bytes = b"definitely not a workbook";
        assert!(matches!(
            DataLoader::load_bytes(FileKind::Spreadsheet, bytes),
            Err(ParseError::Spreadsheet(_))
        ));
    }

    #[test]
    fn test_spreadsheet_cells_conversion() {
        let cells = [Data::Int(3), Data::Empty, Data::Float(1.5)];
        let refs: Vec<&Data> = cells.iter().collect();
        let col = DataLoader::convert_cells("n".to_string(), &refs);
        assert_eq!(col.dtype, ColumnType::Numeric);
        assert_eq!(
            col.values,
            vec![Value::Number(3.0), Value::Null, Value::Number(1.5)]
        );

        let mixed = [Data::Int(3), Data::String("x".into())];
        let refs: Vec<&Data> = mixed.iter().collect();
        let col = DataLoader::convert_cells("m".to_string(), &refs);
        assert_eq!(col.dtype, ColumnType::Object);
        assert_eq!(col.display_values(), vec!["3", "x"]);
    }

    #[test]
    fn test_invalid_cells_message_lists_positions() {
        let err = ParseError::InvalidCells(vec![CellIssue {
            row: 2,
            column: "A".into(),
            value: "abc".into(),
        }]);
        assert_eq!(
            err.to_string(),
            "Invalid numeric values: 'abc' at row 2 in column 'A'"
        );
    }
}
