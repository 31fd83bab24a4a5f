//! NASS Insights Engine
//!
//! Transformation/aggregation layer for USDA QuickStats extracts:
//! - `utils/`: value normalization and series statistics
//! - `record`: typed QuickStats row schema
//! - `filter`: inclusion rules and survey-over-census deduplication
//! - `metrics/`: the analytics passes (rankings, boom, land use, labor,
//!   anomaly, commodity story)
//! - `dashboard`: parallel per-request assembly of every panel
//! - `data`: Polars loaders for parquet/CSV extracts
//!
//! All analytics passes are pure functions over an in-memory record
//! slice; fetching, caching and rendering live outside this crate.

pub mod dashboard;
pub mod data;
pub mod filter;
pub mod metrics;
pub mod record;
pub mod utils;

// Re-export commonly used types
pub use dashboard::{build_dashboard, DashboardRequest, StateDashboard};
pub use filter::prepare;
pub use record::{Metric, RawValue, Record};
pub use metrics::*;
