//! Land-Use Pairing Analyzer
//!
//! Builds the planted-vs-harvested trend from categories that report both
//! metrics. Harvest-only categories (no planting figure anywhere) are
//! excluded entirely, and their count is reported so the caller can say
//! how much of the dataset the chart ignores.
//!
//! Categories where harvested routinely exceeds planted are flagged as
//! multi-harvest: hay and forage crops are cut several times per season,
//! so the ratio is legitimate, not a data error.

use std::collections::BTreeMap;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::record::Record;

/// Harvested/planted ratio above which a year looks like a second cutting.
const MULTI_HARVEST_RATIO: f64 = 1.5;

/// One year of the paired trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LandUsePoint {
    pub year: i32,
    pub planted: f64,
    pub harvested: f64,
}

/// Paired planted/harvested series plus pairing transparency counts.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LandUseTrends {
    pub points: Vec<LandUsePoint>,
    pub paired_category_count: usize,
    pub excluded_category_count: usize,
    pub multi_harvest_categories: Vec<String>,
}

/// Per-category, per-year planted and harvested aggregates.
#[derive(Default)]
struct AreaPair {
    planted: FxHashMap<i32, f64>,
    harvested: FxHashMap<i32, f64>,
}

/// Build the planted-vs-harvested trend over paired categories.
pub fn land_use_trends(records: &[Record]) -> LandUseTrends {
    let mut by_category: FxHashMap<&str, AreaPair> = FxHashMap::default();
    for rec in records {
        let planted = rec.has_statistic("AREA PLANTED");
        let harvested = rec.has_statistic("AREA HARVESTED");
        if !planted && !harvested {
            continue;
        }
        let (Some(commodity), Some(year)) = (rec.commodity.as_deref(), rec.year) else {
            continue;
        };
        let Some(value) = rec.value() else {
            continue;
        };
        let pair = by_category.entry(commodity).or_default();
        if planted {
            *pair.planted.entry(year).or_insert(0.0) += value;
        } else {
            *pair.harvested.entry(year).or_insert(0.0) += value;
        }
    }

    let harvested_categories: FxHashSet<&str> = by_category
        .iter()
        .filter(|(_, pair)| !pair.harvested.is_empty())
        .map(|(cat, _)| *cat)
        .collect();
    let paired: FxHashSet<&str> = harvested_categories
        .iter()
        .copied()
        .filter(|cat| !by_category[*cat].planted.is_empty())
        .collect();
    let excluded_category_count = harvested_categories.len() - paired.len();

    // Multi-harvest detection: majority of observed years above the ratio.
    let mut multi_harvest_categories: Vec<String> = Vec::new();
    for cat in &paired {
        let pair = &by_category[*cat];
        let mut observed = 0usize;
        let mut above = 0usize;
        for (year, &planted) in &pair.planted {
            let Some(&harvested) = pair.harvested.get(year) else {
                continue;
            };
            if planted <= 0.0 {
                continue;
            }
            observed += 1;
            if harvested / planted > MULTI_HARVEST_RATIO {
                above += 1;
            }
        }
        if observed > 0 && above * 2 > observed {
            multi_harvest_categories.push((*cat).to_string());
        }
    }
    multi_harvest_categories.sort();

    // Yearly sums across paired categories only.
    let mut by_year: BTreeMap<i32, (f64, f64)> = BTreeMap::new();
    for cat in &paired {
        let pair = &by_category[*cat];
        for (year, &v) in &pair.planted {
            by_year.entry(*year).or_insert((0.0, 0.0)).0 += v;
        }
        for (year, &v) in &pair.harvested {
            by_year.entry(*year).or_insert((0.0, 0.0)).1 += v;
        }
    }

    let points = by_year
        .into_iter()
        .filter(|(_, (planted, harvested))| *planted > 0.0 || *harvested > 0.0)
        .map(|(year, (planted, harvested))| LandUsePoint {
            year,
            planted,
            harvested,
        })
        .collect();

    LandUseTrends {
        points,
        paired_category_count: paired.len(),
        excluded_category_count,
        multi_harvest_categories,
    }
}
