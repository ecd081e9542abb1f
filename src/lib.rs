//! cellgrid - command-mode driver for the cellgrid sheet.
//!
//! The grid itself lives in `cellgrid-core` and the per-cell formula engine
//! in `cellgrid-engine`; this crate parses driver commands and loads the
//! user's sheet configuration.

pub mod command;
pub mod config;
pub mod error;

pub use command::{Command, run_line};
pub use config::load_config;
pub use error::CommandError;
