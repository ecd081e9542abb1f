//! Cell data structures and formula substitution.
//!
//! This module provides the per-cell half of the engine:
//! - [`Cell`] - raw content, evaluated content, color, observers and the
//!   dependency snapshot a formula is evaluated against
//! - [`CellId`] - arena handle used for observer edges
//! - [`evaluate_content`] - the substitution + expression pipeline
//!
//! A cell never reaches into other cells. Values arrive through
//! [`Cell::update_evaluate`] and the owning sheet forwards the result to
//! [`Cell::observers`].

use std::collections::BTreeMap;

use log::trace;

use super::expr::{coerce_number, evaluate_expression, format_number};
use super::formula::{ArgShape, Function, FunctionCall, ScanMode, scan_calls};
use super::messages;
use super::position::Position;

/// Index of a cell in the owning sheet's arena.
///
/// Ids stay stable while the cell moves between rows and columns.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct CellId(pub usize);

/// A cell in the grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub position: Position,
    /// Exactly what was last written, possibly starting with `=`.
    pub raw: String,
    pub evaluated: String,
    /// Hex color, e.g. `#FFFFFF`.
    pub color: String,
    /// Last known value of every cell this one reads from.
    pub snapshot: BTreeMap<Position, String>,
    /// Cells that read from this one.
    pub observers: Vec<CellId>,
}

impl Cell {
    pub fn new(position: Position, color: &str) -> Cell {
        Cell {
            position,
            raw: String::new(),
            evaluated: String::new(),
            color: color.to_string(),
            snapshot: BTreeMap::new(),
            observers: Vec::new(),
        }
    }

    pub fn is_formula(&self) -> bool {
        self.raw.trim_start().starts_with('=')
    }

    /// Positions this cell currently reads from.
    pub fn dependencies(&self) -> Vec<Position> {
        self.snapshot.keys().copied().collect()
    }

    /// Register `observer` to be told about value changes. Repeated
    /// attaches are ignored.
    pub fn attach(&mut self, observer: CellId) {
        if !self.observers.contains(&observer) {
            self.observers.push(observer);
        }
    }

    pub fn detach(&mut self, observer: CellId) {
        self.observers.retain(|id| *id != observer);
    }

    pub fn recolor(&mut self, color: &str) {
        self.color = color.to_string();
    }

    /// Recompute `evaluated` from `raw` and the snapshot.
    pub fn evaluate(&mut self) {
        self.evaluated = evaluate_content(&self.raw, &self.snapshot);
    }

    /// A cell this one reads from now shows `value`.
    pub fn update_evaluate(&mut self, from: Position, value: &str) {
        self.snapshot.insert(from, value.to_string());
        self.evaluate();
    }

    /// A cell this one reads from moved from `prev` to `new`.
    pub fn update_reference(&mut self, prev: Position, new: Position) {
        trace!("{}: reference {} moved to {}", self.position, prev, new);
        self.raw = super::formula::rewrite_label(&self.raw, prev, new);
        if let Some(value) = self.snapshot.remove(&prev) {
            self.snapshot.insert(new, value);
        }
        self.evaluate();
    }

    /// A cell this one reads from was deleted. The formula is replaced by
    /// the invalid-reference literal and the snapshot is dropped.
    pub fn invalidate(&mut self) {
        trace!("{}: invalidated", self.position);
        self.raw = messages::INVALID_REFERENCE.to_string();
        self.snapshot.clear();
        self.evaluate();
    }
}

/// Evaluate raw cell content against a dependency snapshot.
///
/// Content without a leading `=` is shown trimmed and verbatim. Otherwise
/// every function call is replaced by its value and the remainder is handed
/// to [`evaluate_expression`].
pub fn evaluate_content(raw: &str, snapshot: &BTreeMap<Position, String>) -> String {
    let trimmed = raw.trim();
    if !trimmed.starts_with('=') {
        return trimmed.to_string();
    }

    let substituted = match substitute_calls(trimmed, snapshot) {
        Ok(text) => text,
        Err(message) => return message.to_string(),
    };
    let body = substituted.strip_prefix('=').unwrap_or(&substituted);
    evaluate_expression(body)
}

fn substitute_calls(
    text: &str,
    snapshot: &BTreeMap<Position, String>,
) -> Result<String, &'static str> {
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;

    for call in scan_calls(text, ScanMode::Lenient) {
        let function = call.function().ok_or(messages::INVALID_FUNCTION)?;
        let values = resolve(&call, snapshot);
        let replacement = match function {
            Function::Ref => match values.as_slice() {
                [value] => Some(value.clone()),
                _ => None,
            },
            Function::Sum => {
                let sum = sum_of(&values).ok_or(messages::SUM_NON_NUMBER)?;
                Some(format_number(sum))
            }
            Function::Avg => {
                let sum = sum_of(&values).ok_or(messages::AVG_NON_NUMBER)?;
                Some(format_number(sum / values.len() as f64))
            }
        };

        if let Some(replacement) = replacement {
            out.push_str(&text[copied..call.span.start]);
            out.push_str(&replacement);
            copied = call.span.end;
        }
    }

    out.push_str(&text[copied..]);
    Ok(out)
}

/// Snapshot values for the call's arguments. Missing or blank values read
/// as `0`; an argument list that does not decode yields nothing.
///
/// A range reads the snapshot entries inside its rectangle instead of
/// expanding it, so its size is bounded by what the cell observes.
fn resolve(call: &FunctionCall<'_>, snapshot: &BTreeMap<Position, String>) -> Vec<String> {
    let positions = match (call.shape(), call.range_corners()) {
        (ArgShape::Range, Some((a, b))) => snapshot
            .keys()
            .copied()
            .filter(|pos| pos.is_within(a, b))
            .collect(),
        (ArgShape::Range, None) => Vec::new(),
        _ => call.positions().unwrap_or_default(),
    };
    positions
        .into_iter()
        .map(|pos| match snapshot.get(&pos) {
            Some(value) if !value.is_empty() => value.clone(),
            _ => "0".to_string(),
        })
        .collect()
}

fn sum_of(values: &[String]) -> Option<f64> {
    values
        .iter()
        .try_fold(0.0, |acc, value| Some(acc + coerce_number(value)?))
}
