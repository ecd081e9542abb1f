//! cellgrid-engine - cell positions, formula grammar and per-cell evaluation.

pub mod engine;
