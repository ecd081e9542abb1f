//! Spreadsheet engine API.
//!
//! This module provides the grid-independent parts of the engine:
//!
//! - [`Position`] - Cell label parsing (A1 notation ↔ row/col indices)
//! - [`evaluate_expression`] - Arithmetic and string concatenation
//! - [`scan_calls`], [`FunctionCall`], [`BUILTINS`] - Formula grammar
//! - [`Cell`], [`CellId`] - Cell storage and formula substitution
//! - [`find_cycle`], [`DependencyGraph`] - Circular reference detection
//! - [`messages`] - `ERROR:` display strings

mod cell;
mod cycle;
mod expr;
mod formula;
pub mod messages;
mod position;

pub use cell::{Cell, CellId, evaluate_content};
pub use cycle::{DependencyGraph, find_cycle};
pub use expr::{coerce_number, evaluate_expression, format_number, round_to_thousandths};
pub use formula::{
    ArgShape, BUILTINS, Builtin, Function, FunctionCall, ReferenceError, ScanMode, rewrite_label,
    scan_calls,
};
pub use position::Position;
