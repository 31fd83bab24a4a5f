//! Utility modules shared across the analytics passes:
//! - Value normalization: raw QuickStats cells to `Option<f64>`
//! - Stats: mean / population stddev / median helpers

pub mod stats;
pub mod value;

// Re-export commonly used functions
pub use stats::{mean, median, population_stddev};
pub use value::normalize;
