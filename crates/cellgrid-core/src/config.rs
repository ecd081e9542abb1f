//! Sheet construction settings.

use serde::{Deserialize, Serialize};

pub const DEFAULT_WIDTH: usize = 30;
pub const DEFAULT_HEIGHT: usize = 30;
pub const DEFAULT_COLOR: &str = "#FFFFFF";

/// Size and initial cell color of a new sheet.
///
/// Every field is optional when deserialized; missing fields take their
/// defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
    pub default_color: String,
}

impl Default for SheetConfig {
    fn default() -> Self {
        SheetConfig {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            default_color: DEFAULT_COLOR.to_string(),
        }
    }
}
