//! Commodity Story Composer
//!
//! Merges per-year production, yield, area and revenue for one commodity
//! into a single timeline, then annotates low-outlier yield years.
//!
//! Revenue uses the maximum dollar SALES figure per year, not the sum:
//! national totals repeat across sub-reports and summing double counts.
//! Some commodities report revenue only under the economics sector, so a
//! second pass over the full record set backfills revenue and planted
//! area where the crops-sector pass found nothing.

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::metrics::anomaly::detect_anomalies;
use crate::record::Record;

const CROPS_SECTOR: &str = "CROPS";
const YIELD_SENSITIVITY: f64 = 1.0;

/// One year of a commodity's timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommodityStoryPoint {
    pub year: i32,
    pub production: f64,
    // `yield` is reserved in Rust; keep the wire name for the charts.
    #[serde(rename = "yield")]
    pub yield_value: f64,
    pub area_harvested: f64,
    pub area_planted: f64,
    pub revenue: f64,
    pub is_anomaly: bool,
}

/// Year-sorted timeline plus the flagged yield years.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CommodityStory {
    pub points: Vec<CommodityStoryPoint>,
    pub anomaly_years: Vec<i32>,
}

#[derive(Default)]
struct YearAccumulator {
    production: f64,
    yields: Vec<f64>,
    area_harvested: f64,
    area_planted: f64,
    revenue_max: Option<f64>,
}

fn is_revenue_row(rec: &Record) -> bool {
    rec.has_statistic("SALES") && rec.is_dollar_unit()
}

/// Compose the timeline for `commodity`.
pub fn commodity_story(records: &[Record], commodity: &str) -> CommodityStory {
    let for_commodity = |rec: &Record| {
        rec.commodity
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(commodity))
    };

    // Crops-sector pass.
    let mut by_year: FxHashMap<i32, YearAccumulator> = FxHashMap::default();
    for rec in records {
        if !for_commodity(rec) {
            continue;
        }
        let crops = rec
            .sector
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case(CROPS_SECTOR));
        if !crops {
            continue;
        }
        let Some(year) = rec.year else {
            continue;
        };
        let Some(value) = rec.value() else {
            continue;
        };
        let acc = by_year.entry(year).or_default();
        if rec.has_statistic("PRODUCTION") && !rec.is_dollar_unit() {
            acc.production += value;
        } else if rec.has_statistic("YIELD") {
            acc.yields.push(value);
        } else if rec.has_statistic("AREA HARVESTED") {
            acc.area_harvested += value;
        } else if rec.has_statistic("AREA PLANTED") {
            acc.area_planted += value;
        } else if is_revenue_row(rec) {
            acc.revenue_max = Some(acc.revenue_max.map_or(value, |m: f64| m.max(value)));
        }
    }

    // Full-set pass: revenue and planted area reported outside crops.
    let mut revenue_any: FxHashMap<i32, f64> = FxHashMap::default();
    let mut planted_any: FxHashMap<i32, f64> = FxHashMap::default();
    for rec in records {
        if !for_commodity(rec) {
            continue;
        }
        let Some(year) = rec.year else {
            continue;
        };
        let Some(value) = rec.value() else {
            continue;
        };
        if is_revenue_row(rec) {
            let entry = revenue_any.entry(year).or_insert(value);
            if value > *entry {
                *entry = value;
            }
        } else if rec.has_statistic("AREA PLANTED") {
            *planted_any.entry(year).or_insert(0.0) += value;
        }
    }

    let mut points: Vec<CommodityStoryPoint> = by_year
        .into_iter()
        .map(|(year, acc)| {
            let yield_value = if acc.yields.is_empty() {
                0.0
            } else {
                acc.yields.iter().sum::<f64>() / acc.yields.len() as f64
            };
            // Backfill only where the crops pass found nothing.
            let revenue = match acc.revenue_max {
                Some(r) if r != 0.0 => r,
                _ => revenue_any.get(&year).copied().unwrap_or(0.0),
            };
            let area_planted = if acc.area_planted != 0.0 {
                acc.area_planted
            } else {
                planted_any.get(&year).copied().unwrap_or(0.0)
            };
            CommodityStoryPoint {
                year,
                production: acc.production,
                yield_value,
                area_harvested: acc.area_harvested,
                area_planted,
                revenue,
                is_anomaly: false,
            }
        })
        .collect();
    points.sort_by_key(|p| p.year);

    let yield_series: Vec<(i32, f64)> = points.iter().map(|p| (p.year, p.yield_value)).collect();
    let anomaly_years: Vec<i32> = detect_anomalies(&yield_series, YIELD_SENSITIVITY)
        .into_iter()
        .map(|flag| flag.year)
        .collect();
    for point in &mut points {
        point.is_anomaly = anomaly_years.contains(&point.year);
    }

    CommodityStory {
        points,
        anomaly_years,
    }
}
