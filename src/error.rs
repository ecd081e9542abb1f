//! Error types for the cellgrid command driver

use cellgrid_core::SheetError;
use thiserror::Error;

/// Errors a driver command can fail with.
///
/// Cell content problems are not errors here; they show up as `ERROR:` text
/// in the cell and are printed like any other value.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("{command} requires {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },

    #[error("Unexpected argument to {command}: {arg}")]
    UnexpectedArgument { command: &'static str, arg: String },

    #[error("Invalid cell label: {0}")]
    InvalidLabel(String),

    #[error("Cell {0} is outside the sheet")]
    OutOfBounds(String),

    #[error("Invalid row number: {0}")]
    InvalidRow(String),

    #[error("Invalid column letters: {0}")]
    InvalidColumn(String),

    #[error(transparent)]
    Sheet(#[from] SheetError),
}

pub type Result<T> = std::result::Result<T, CommandError>;
