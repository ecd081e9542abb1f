//! Cell position parsing and formatting.
//!
//! Provides bidirectional conversion between spreadsheet-style cell labels
//! (e.g., "A1", "B2", "AA100") and zero-indexed row/column coordinates.
//!
//! # Examples
//!
//! ```
//! use cellgrid_engine::engine::Position;
//!
//! let pos = Position::from_label("B3").unwrap();
//! assert_eq!(pos.row, 2); // 0-indexed
//! assert_eq!(pos.col, 1);
//! assert_eq!(pos.to_string(), "B3");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// A cell position by row and column indices (0-indexed).
///
/// Ordering is row-major, which is also the order range rectangles expand in.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Position {
        Position { row, col }
    }

    /// Parse a label from spreadsheet notation (e.g., "A1", "b2", "AA10").
    ///
    /// The whole string must be letters followed by digits; anything else
    /// (stray characters, surrounding whitespace, row `0`) yields `None`.
    pub fn from_label(label: &str) -> Option<Position> {
        let caps = label_re().captures(label)?;
        let col = Self::letters_to_col(&caps["letters"])?;
        let row = caps["numbers"].parse::<usize>().ok()?.checked_sub(1)?;
        Some(Position::new(row, col))
    }

    /// Format this position as an uppercase label.
    pub fn label(&self) -> String {
        format!("{}{}", Self::col_to_letters(self.col), self.row + 1)
    }

    /// Decode column letters (case-insensitive) to an index (A -> 0, Z -> 25, AA -> 26).
    pub fn letters_to_col(letters: &str) -> Option<usize> {
        if letters.is_empty() {
            return None;
        }
        let mut col_acc = 0usize;
        for c in letters.bytes() {
            if !c.is_ascii_alphabetic() {
                return None;
            }
            let digit = (c.to_ascii_uppercase() - b'A') as usize + 1;
            col_acc = col_acc.checked_mul(26)?.checked_add(digit)?;
        }
        col_acc.checked_sub(1)
    }

    /// Convert column index to spreadsheet-style letters (0 -> A, 25 -> Z, 26 -> AA).
    pub fn col_to_letters(col: usize) -> String {
        let mut result = String::new();
        let mut n = col as u128 + 1;
        while n > 0 {
            n -= 1;
            result.insert(0, (b'A' + (n % 26) as u8) as char);
            n /= 26;
        }
        result
    }

    /// Every position in the rectangle spanned by two corners, in row-major
    /// order starting from the lowest row and column. Corner order does not
    /// matter. The corners should already be checked against the sheet.
    pub fn rect(a: Position, b: Position) -> Vec<Position> {
        let (min_row, max_row) = (a.row.min(b.row), a.row.max(b.row));
        let (min_col, max_col) = (a.col.min(b.col), a.col.max(b.col));
        let mut out = Vec::new();
        for row in min_row..=max_row {
            for col in min_col..=max_col {
                out.push(Position::new(row, col));
            }
        }
        out
    }

    /// Whether this position lies in the rectangle spanned by `a` and `b`.
    pub fn is_within(&self, a: Position, b: Position) -> bool {
        (a.row.min(b.row)..=a.row.max(b.row)).contains(&self.row)
            && (a.col.min(b.col)..=a.col.max(b.col)).contains(&self.col)
    }
}

fn label_re() -> &'static Regex {
    static LABEL_RE: OnceLock<Regex> = OnceLock::new();
    LABEL_RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Za-z]+)(?<numbers>[0-9]+)$")
            .expect("cell label regex must compile")
    })
}

impl std::str::FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| format!("Invalid cell label: {}", s))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Position::col_to_letters(self.col), self.row + 1)
    }
}
