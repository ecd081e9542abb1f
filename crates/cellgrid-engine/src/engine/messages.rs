//! Display text for every error a cell can show.
//!
//! Failures never leave the engine as Rust errors; they are stored as a
//! cell's evaluated (and for invalidated references, raw) content.

pub const INVALID_POSITION: &str = "ERROR: invalid cell position";
pub const INVALID_POSITIONS: &str = "ERROR: invalid cell positions";
pub const CIRCULAR_REFERENCE: &str = "ERROR: circular reference failed to set content";
pub const INVALID_REFERENCE: &str = "ERROR: invalid reference.";
pub const SUM_NON_NUMBER: &str = "ERROR: SUM cannot perform on non-numbers";
pub const AVG_NON_NUMBER: &str = "ERROR: AVG cannot perform on non-numbers";
pub const DIVIDE_BY_ZERO: &str = "ERROR: Divide By Zero";
pub const ZERO_BY_ZERO: &str = "ERROR: Zero divided By Zero";
pub const TYPE_MISMATCH: &str = "ERROR: Type mismatch";
pub const NO_FUNCTION: &str = "ERROR: No function given after =";
pub const INVALID_FUNCTION: &str = "ERROR: Invalid function.";
pub const INVALID_EXPRESSION: &str = "ERROR: Invalid expression";
