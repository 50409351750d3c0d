//! Batch submission of calculator input read from CSV.

mod loader;
mod runner;

pub use loader::{BatchError, BatchLoader, BatchRow, CALCULATOR_COLUMN};
pub use runner::{BatchOutcome, BatchRunner};
