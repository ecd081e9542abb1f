//! Error types for cellgrid core.
//!
//! Problems with cell content never surface here; they are shown as
//! `ERROR:` text in the cell. These errors cover caller mistakes.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SheetError {
    #[error("Row {index} is out of range (sheet has {rows} rows)")]
    RowOutOfRange { index: usize, rows: usize },

    #[error("Column {index} is out of range (sheet has {cols} columns)")]
    ColumnOutOfRange { index: usize, cols: usize },
}

pub type Result<T> = std::result::Result<T, SheetError>;
