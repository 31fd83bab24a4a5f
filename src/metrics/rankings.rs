//! Aggregation Engine: top-N rankings, multi-series trends, state map totals
//!
//! Three group-and-reduce passes behind one metric-resolution rule
//! (see `metric_rows` in the parent module for the revenue fallback).

use std::collections::BTreeMap;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::metrics::{matches_metric, metric_rows, resolve_categories};
use crate::record::{Metric, Record};

/// One bar of a top-N ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub category: String,
    pub value: f64,
}

/// One year of a multi-series trend: the requested categories become
/// flattened JSON fields next to `year`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearSeriesPoint {
    pub year: i32,
    #[serde(flatten)]
    pub series: BTreeMap<String, f64>,
}

/// Top `n` categories by summed metric value for one year.
///
/// Non-positive sums are dropped; output is sorted descending by value.
pub fn top_n(records: &[Record], year: i32, metric: Metric, n: usize) -> Vec<RankedEntry> {
    let mut totals: FxHashMap<&str, f64> = FxHashMap::default();
    for (category, row_year, value) in metric_rows(records, metric) {
        if row_year == year {
            *totals.entry(category).or_insert(0.0) += value;
        }
    }

    let mut entries: Vec<RankedEntry> = totals
        .into_iter()
        .filter(|(_, v)| *v > 0.0)
        .map(|(category, value)| RankedEntry {
            category: category.to_string(),
            value,
        })
        .collect();
    entries.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });
    entries.truncate(n);
    entries
}

/// Per-year series for the requested categories.
///
/// Every returned point carries a value for every requested category;
/// years with no data for a category report 0 rather than omitting the
/// field, so chart series stay aligned.
pub fn trend(records: &[Record], metric: Metric, categories: &[&str]) -> Vec<YearSeriesPoint> {
    let wanted: FxHashSet<&str> = categories.iter().copied().collect();

    let mut by_year: BTreeMap<i32, BTreeMap<String, f64>> = BTreeMap::new();
    for (category, year, value) in metric_rows(records, metric) {
        if wanted.contains(category) {
            *by_year
                .entry(year)
                .or_default()
                .entry(category.to_string())
                .or_insert(0.0) += value;
        }
    }

    by_year
        .into_iter()
        .map(|(year, mut series)| {
            for cat in categories {
                series.entry((*cat).to_string()).or_insert(0.0);
            }
            YearSeriesPoint { year, series }
        })
        .collect()
}

/// Summed metric value per state for one year, keyed by state code.
///
/// The national aggregate row is excluded so the map never mixes the US
/// total into a state tile.
pub fn map_aggregate(records: &[Record], year: i32, metric: Metric) -> BTreeMap<String, f64> {
    let resolved = resolve_categories(records, metric);

    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for rec in records {
        if rec.year != Some(year) || rec.is_national() {
            continue;
        }
        let Some(state) = rec.state_code.as_deref() else {
            continue;
        };
        if !matches_metric(rec, metric, &resolved) {
            continue;
        }
        if let Some(value) = rec.value() {
            *totals.entry(state.to_string()).or_insert(0.0) += value;
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{AggLevel, RawValue};
    use approx::assert_relative_eq;

    fn rec(commodity: &str, stat: &str, unit: &str, year: i32, value: f64) -> Record {
        Record {
            commodity: Some(commodity.to_string()),
            statistic_category: Some(stat.to_string()),
            unit: Some(unit.to_string()),
            year: Some(year),
            state_code: Some("IN".to_string()),
            aggregation_level: Some(AggLevel::State),
            raw_value: RawValue::Number(value),
            ..Default::default()
        }
    }

    #[test]
    fn test_top_n_sorted_positive_truncated() {
        let records = vec![
            rec("CORN", "AREA HARVESTED", "ACRES", 2020, 500.0),
            rec("CORN", "AREA HARVESTED", "ACRES", 2020, 100.0),
            rec("SOYBEANS", "AREA HARVESTED", "ACRES", 2020, 400.0),
            rec("OATS", "AREA HARVESTED", "ACRES", 2020, -10.0),
            rec("HAY", "AREA HARVESTED", "ACRES", 2019, 999.0), // wrong year
        ];
        let out = top_n(&records, 2020, Metric::AreaHarvested, 10);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].category, "CORN");
        assert_relative_eq!(out[0].value, 600.0);
        assert_eq!(out[1].category, "SOYBEANS");
        assert!(out.windows(2).all(|w| w[0].value >= w[1].value));

        let truncated = top_n(&records, 2020, Metric::AreaHarvested, 1);
        assert_eq!(truncated.len(), 1);
    }

    #[test]
    fn test_trend_fills_missing_categories_with_zero() {
        let records = vec![
            rec("CORN", "AREA HARVESTED", "ACRES", 2019, 100.0),
            rec("CORN", "AREA HARVESTED", "ACRES", 2020, 110.0),
            rec("SOYBEANS", "AREA HARVESTED", "ACRES", 2020, 80.0),
        ];
        let out = trend(&records, Metric::AreaHarvested, &["CORN", "SOYBEANS"]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].year, 2019);
        assert_relative_eq!(out[0].series["CORN"], 100.0);
        assert_relative_eq!(out[0].series["SOYBEANS"], 0.0);
        assert_relative_eq!(out[1].series["SOYBEANS"], 80.0);
    }

    #[test]
    fn test_trend_serializes_flat() {
        let records = vec![rec("CORN", "AREA HARVESTED", "ACRES", 2020, 110.0)];
        let out = trend(&records, Metric::AreaHarvested, &["CORN"]);
        let json = serde_json::to_value(&out[0]).unwrap();
        assert_eq!(json["year"], 2020);
        assert_eq!(json["CORN"], 110.0);
    }

    #[test]
    fn test_map_aggregate_excludes_national_row() {
        let mut national = rec("CORN", "AREA HARVESTED", "ACRES", 2020, 9999.0);
        national.state_code = Some("US".to_string());
        national.aggregation_level = Some(AggLevel::National);
        let mut iowa = rec("CORN", "AREA HARVESTED", "ACRES", 2020, 700.0);
        iowa.state_code = Some("IA".to_string());

        let records = vec![national, iowa, rec("CORN", "AREA HARVESTED", "ACRES", 2020, 500.0)];
        let out = map_aggregate(&records, 2020, Metric::AreaHarvested);
        assert_eq!(out.len(), 2);
        assert_relative_eq!(out["IA"], 700.0);
        assert_relative_eq!(out["IN"], 500.0);
        assert!(!out.contains_key("US"));
    }

    #[test]
    fn test_map_aggregate_revenue_uses_resolved_category_only() {
        // CORN reports dollars under both SALES and PRODUCTION; only the
        // preferred SALES rows may reach the state total.
        let records = vec![
            rec("CORN", "SALES", "$", 2020, 100.0),
            rec("CORN", "PRODUCTION", "$", 2020, 50.0),
        ];
        let out = map_aggregate(&records, 2020, Metric::Revenue);
        assert_relative_eq!(out["IN"], 100.0);
    }

    #[test]
    fn test_map_aggregate_revenue_fallback_per_commodity() {
        // HAY has no dollar SALES anywhere, so its PRODUCTION dollars count.
        let mut hay_iowa = rec("HAY", "PRODUCTION", "$", 2020, 40.0);
        hay_iowa.state_code = Some("IA".to_string());
        let records = vec![
            rec("CORN", "SALES", "$", 2020, 100.0),
            rec("CORN", "PRODUCTION", "$", 2020, 50.0),
            hay_iowa,
        ];
        let out = map_aggregate(&records, 2020, Metric::Revenue);
        assert_relative_eq!(out["IN"], 100.0);
        assert_relative_eq!(out["IA"], 40.0);
    }
}
