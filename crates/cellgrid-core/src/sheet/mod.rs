//! Sheet state and logic.

mod filter;
mod ops;
mod propagate;
mod state;
mod structure;

pub use state::Sheet;
