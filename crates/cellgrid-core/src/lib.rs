//! cellgrid-core - the sheet model: cells, dependency edges and structural edits.

pub mod config;
pub mod error;
pub mod sheet;

pub use config::SheetConfig;
pub use error::{Result, SheetError};
pub use sheet::Sheet;

pub use cellgrid_engine::engine::{Cell, Position};
