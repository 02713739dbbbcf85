//! Data module - table model, file loading and manual entry

mod loader;
mod manual;
mod table;

pub use loader::{CellIssue, DataLoader, FileKind, ParseError};
pub use manual::{ManualColumn, ManualGrid};
pub use table::{Column, ColumnType, Table, TableError, Value};
