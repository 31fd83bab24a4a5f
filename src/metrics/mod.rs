//! Analytics passes for the dashboard
//!
//! Each pass is implemented in its own module and consumes the filtered,
//! deduplicated record collection produced by `filter::prepare`. All passes
//! are pure functions: empty input gives an empty result, never an error.

pub mod anomaly;
pub mod boom;
pub mod labor;
pub mod land_use;
pub mod rankings;
pub mod story;

// Re-export pass entry points and result types
pub use anomaly::{detect_anomalies, AnomalyFlag};
pub use boom::{boom, GrowthEntry};
pub use labor::{labor_trends, LaborTrendRow, LaborTrends, PeerConfig};
pub use land_use::{land_use_trends, LandUsePoint, LandUseTrends};
pub use rankings::{map_aggregate, top_n, trend, RankedEntry, YearSeriesPoint};
pub use story::{commodity_story, CommodityStory, CommodityStoryPoint};

use rustc_hash::{FxHashMap, FxHashSet};

use crate::record::{Metric, Record};

fn admissible(rec: &Record, category: &str, dollar_only: bool) -> bool {
    rec.has_statistic(category) && (!dollar_only || rec.is_dollar_unit())
}

/// Which candidate statistic category each commodity actually reports
/// under: SALES if that commodity has any parseable dollar SALES, else
/// PRODUCTION, else VALUE. Empty for single-category metrics.
pub(crate) fn resolve_categories<'a>(
    records: &'a [Record],
    metric: Metric,
) -> FxHashMap<&'a str, &'static str> {
    let candidates = metric.statistic_categories();
    let dollar_only = metric.requires_dollar_unit();

    let mut resolved: FxHashMap<&str, &'static str> = FxHashMap::default();
    if candidates.len() > 1 {
        let mut present: FxHashMap<&str, FxHashSet<&'static str>> = FxHashMap::default();
        for rec in records {
            let Some(commodity) = rec.commodity.as_deref() else {
                continue;
            };
            if rec.value().is_none() {
                continue;
            }
            for &cat in candidates {
                if admissible(rec, cat, dollar_only) {
                    present.entry(commodity).or_default().insert(cat);
                }
            }
        }
        for (commodity, cats) in present {
            if let Some(best) = candidates.iter().copied().find(|c| cats.contains(c)) {
                resolved.insert(commodity, best);
            }
        }
    }
    resolved
}

/// Does `rec` report under its commodity's resolved category for `metric`?
pub(crate) fn matches_metric(
    rec: &Record,
    metric: Metric,
    resolved: &FxHashMap<&str, &'static str>,
) -> bool {
    let candidates = metric.statistic_categories();
    let category = if candidates.len() > 1 {
        let Some(category) = rec.commodity.as_deref().and_then(|c| resolved.get(c)) else {
            return false; // no SALES/PRODUCTION/VALUE data at all
        };
        *category
    } else {
        candidates[0]
    };
    admissible(rec, category, metric.requires_dollar_unit())
}

/// Resolve a metric to per-row (category, year, value) observations.
///
/// Rows without a commodity, year or parseable value are skipped; the
/// per-commodity revenue fallback comes from `resolve_categories`.
pub(crate) fn metric_rows<'a>(records: &'a [Record], metric: Metric) -> Vec<(&'a str, i32, f64)> {
    let resolved = resolve_categories(records, metric);

    let mut rows = Vec::new();
    for rec in records {
        let (Some(commodity), Some(year)) = (rec.commodity.as_deref(), rec.year) else {
            continue;
        };
        let Some(value) = rec.value() else {
            continue;
        };
        if matches_metric(rec, metric, &resolved) {
            rows.push((commodity, year, value));
        }
    }
    rows
}
