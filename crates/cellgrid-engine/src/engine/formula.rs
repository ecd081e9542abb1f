//! Formula grammar shared by dependency registration and value substitution.
//!
//! A function call is three letters immediately followed by a parenthesized
//! argument body, e.g. `SUM(A1:B3)`. Two scan modes read the same grammar:
//!
//! - [`ScanMode::Strict`] decides which cells a formula depends on. Heads must
//!   be uppercase and the body runs to the first `)`.
//! - [`ScanMode::Lenient`] finds calls to substitute during evaluation. Heads
//!   may be any case (so `sum(A1)` is found and then rejected as an unknown
//!   function) and the body is limited to label characters and separators.
//!
//! Conventions:
//! - Built-in names are ALL CAPS and matched case-sensitively.
//! - If you add a built-in, add it to [`BUILTINS`] and teach
//!   [`crate::engine::Cell`] how to substitute it.

use std::ops::Range;

use super::position::Position;

/// The substitution performed for a call head.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Function {
    Ref,
    Sum,
    Avg,
}

pub struct Builtin {
    pub name: &'static str,
    pub function: Function,
    pub description: &'static str,
}

pub const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "REF",
        function: Function::Ref,
        description: "Value of a single referenced cell",
    },
    Builtin {
        name: "SUM",
        function: Function::Sum,
        description: "Sum of numeric values in a cell, list or range",
    },
    Builtin {
        name: "AVG",
        function: Function::Avg,
        description: "Average of numeric values in a cell, list or range",
    },
];

impl Function {
    /// Look up a call head. Case-sensitive: `sum` is not `SUM`.
    pub fn from_head(head: &str) -> Option<Function> {
        BUILTINS
            .iter()
            .find(|b| b.name == head)
            .map(|b| b.function)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanMode {
    Strict,
    Lenient,
}

impl ScanMode {
    fn accepts_head(self, b: u8) -> bool {
        match self {
            ScanMode::Strict => b.is_ascii_uppercase(),
            ScanMode::Lenient => b.is_ascii_alphabetic(),
        }
    }

    fn accepts_body(self, b: u8) -> bool {
        match self {
            ScanMode::Strict => b != b')',
            ScanMode::Lenient => {
                b.is_ascii_alphanumeric() || matches!(b, b',' | b':' | b' ' | b'+')
            }
        }
    }
}

/// How a call's argument body names its cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgShape {
    /// `A1`
    Single,
    /// `A1, B2, C3`
    List,
    /// `A1:B3`, the rectangle between two corners
    Range,
}

/// Why a strict call failed validation against the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReferenceError {
    InvalidPosition,
    InvalidPositions,
}

impl ReferenceError {
    pub fn message(self) -> &'static str {
        match self {
            ReferenceError::InvalidPosition => super::messages::INVALID_POSITION,
            ReferenceError::InvalidPositions => super::messages::INVALID_POSITIONS,
        }
    }
}

/// One function call found in formula text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionCall<'a> {
    pub head: &'a str,
    pub body: &'a str,
    /// Byte range of the whole call (head through closing paren).
    pub span: Range<usize>,
}

impl<'a> FunctionCall<'a> {
    pub fn function(&self) -> Option<Function> {
        Function::from_head(self.head)
    }

    pub fn shape(&self) -> ArgShape {
        match (self.body.contains(':'), self.body.contains(',')) {
            (true, false) => ArgShape::Range,
            (false, true) => ArgShape::List,
            _ => ArgShape::Single,
        }
    }

    /// Argument labels, trimmed.
    pub fn parts(&self) -> Vec<&'a str> {
        match self.shape() {
            ArgShape::Range => self.body.split(':').map(str::trim).collect(),
            ArgShape::List => self.body.split(',').map(str::trim).collect(),
            ArgShape::Single => vec![self.body.trim()],
        }
    }

    /// The two corners of a range call, if it is one and both decode.
    pub fn range_corners(&self) -> Option<(Position, Position)> {
        if self.shape() != ArgShape::Range {
            return None;
        }
        match self.parts().as_slice() {
            [a, b] => Some((Position::from_label(a)?, Position::from_label(b)?)),
            _ => None,
        }
    }

    /// Positions named by the arguments, without bounds checks.
    ///
    /// Returns `None` if any label fails to decode.
    pub fn positions(&self) -> Option<Vec<Position>> {
        match self.shape() {
            ArgShape::Range => {
                let (a, b) = self.range_corners()?;
                Some(Position::rect(a, b))
            }
            _ => self
                .parts()
                .into_iter()
                .map(Position::from_label)
                .collect(),
        }
    }

    /// Positions named by the arguments, checked against a grid of
    /// `rows` x `cols` for a formula stored at `origin`.
    ///
    /// Every label must decode, fall inside the grid and differ from
    /// `origin`. Ranges are checked on their corners and then expanded.
    pub fn validated_positions(
        &self,
        origin: Position,
        rows: usize,
        cols: usize,
    ) -> Result<Vec<Position>, ReferenceError> {
        let shape = self.shape();
        let error = match shape {
            ArgShape::Single => ReferenceError::InvalidPosition,
            _ => ReferenceError::InvalidPositions,
        };

        let parts = self.parts();
        if shape == ArgShape::Range && parts.len() != 2 {
            return Err(error);
        }

        let mut positions = Vec::with_capacity(parts.len());
        for part in parts {
            let pos = Position::from_label(part).ok_or(error)?;
            if pos.row >= rows || pos.col >= cols || pos == origin {
                return Err(error);
            }
            positions.push(pos);
        }

        if shape == ArgShape::Range {
            return Ok(Position::rect(positions[0], positions[1]));
        }
        Ok(positions)
    }
}

/// Find function calls in `text`, leftmost first, without overlaps.
pub fn scan_calls(text: &str, mode: ScanMode) -> Vec<FunctionCall<'_>> {
    let bytes = text.as_bytes();
    let mut calls = Vec::new();
    let mut start = 0;

    while start + 4 <= bytes.len() {
        match match_call_at(bytes, start, mode) {
            Some(end) => {
                calls.push(FunctionCall {
                    head: &text[start..start + 3],
                    body: &text[start + 4..end - 1],
                    span: start..end,
                });
                start = end;
            }
            None => start += 1,
        }
    }

    calls
}

fn match_call_at(bytes: &[u8], start: usize, mode: ScanMode) -> Option<usize> {
    if !bytes[start..start + 3].iter().all(|&b| mode.accepts_head(b)) || bytes[start + 3] != b'(' {
        return None;
    }
    let mut i = start + 4;
    while i < bytes.len() {
        match bytes[i] {
            b')' => return Some(i + 1),
            b if mode.accepts_body(b) => i += 1,
            _ => return None,
        }
    }
    None
}

/// Replace every standalone occurrence of `from`'s label in `text` with
/// `to`'s label.
///
/// An occurrence is standalone when it is not preceded by a letter and not
/// followed by a digit, so moving `A1` leaves `AA1` and `A10` alone. Letters
/// match case-insensitively; the replacement is always uppercase.
pub fn rewrite_label(text: &str, from: Position, to: Position) -> String {
    let needle = from.label();
    let replacement = to.label();
    let bytes = text.as_bytes();
    let len = needle.len();

    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut i = 0;

    while i + len <= bytes.len() {
        let standalone = bytes[i..i + len].eq_ignore_ascii_case(needle.as_bytes())
            && (i == 0 || !bytes[i - 1].is_ascii_alphabetic())
            && bytes.get(i + len).is_none_or(|b| !b.is_ascii_digit());
        if standalone {
            out.push_str(&text[copied..i]);
            out.push_str(&replacement);
            i += len;
            copied = i;
        } else {
            i += 1;
        }
    }

    out.push_str(&text[copied..]);
    out
}
