//! Growth ("Boom") Detector
//!
//! Ranks categories by percentage growth between two years. Tiny start-year
//! bases produce spectacular but meaningless percentages, so categories must
//! clear a dynamic minimum base: the larger of a fixed floor and a quarter
//! of the median positive start-year aggregate.

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::metrics::metric_rows;
use crate::record::{Metric, Record};
use crate::utils::stats::median;

/// Fixed floor for the minimum start-year base.
pub const MIN_BASE_FLOOR: f64 = 10_000.0;

/// One fast-growing category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthEntry {
    pub category: String,
    pub growth_pct: f64,
    pub start_value: f64,
    pub end_value: f64,
}

/// Top `top_n` categories by percentage growth from `start_year` to
/// `end_year`.
///
/// A category absent in the start year has no defined base and is
/// excluded; so is any category whose start aggregate does not exceed
/// the dynamic threshold or whose end aggregate is not positive.
pub fn boom(
    records: &[Record],
    metric: Metric,
    end_year: i32,
    start_year: i32,
    top_n: usize,
) -> Vec<GrowthEntry> {
    let mut start: FxHashMap<&str, f64> = FxHashMap::default();
    let mut end: FxHashMap<&str, f64> = FxHashMap::default();
    for (category, year, value) in metric_rows(records, metric) {
        if year == start_year {
            *start.entry(category).or_insert(0.0) += value;
        } else if year == end_year {
            *end.entry(category).or_insert(0.0) += value;
        }
    }

    let positive_starts: Vec<f64> = start.values().copied().filter(|v| *v > 0.0).collect();
    let threshold = match median(&positive_starts) {
        Some(m) => MIN_BASE_FLOOR.max(m / 4.0),
        None => MIN_BASE_FLOOR,
    };

    let mut entries: Vec<GrowthEntry> = start
        .iter()
        .filter_map(|(category, &start_value)| {
            let &end_value = end.get(category)?;
            if start_value <= threshold || end_value <= 0.0 {
                return None;
            }
            Some(GrowthEntry {
                category: (*category).to_string(),
                growth_pct: (end_value - start_value) / start_value * 100.0,
                start_value,
                end_value,
            })
        })
        .collect();

    entries.sort_by(|a, b| {
        b.growth_pct
            .partial_cmp(&a.growth_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });
    entries.truncate(top_n);
    entries
}
