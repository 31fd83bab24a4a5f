//! Dashboard coordinator
//!
//! Assembles every analytics panel for one state request. The passes are
//! pure functions over the filtered record set, so they run in parallel
//! with Rayon; the filter/dedup pass runs once up front and its output is
//! shared read-only.

use rayon::join;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::filter;
use crate::metrics::{
    boom, commodity_story, labor_trends, land_use_trends, map_aggregate, top_n, trend,
    CommodityStory, GrowthEntry, LaborTrends, LandUseTrends, PeerConfig, RankedEntry,
    YearSeriesPoint,
};
use crate::record::{Metric, Record};

/// Parameters for one dashboard build.
#[derive(Debug, Clone)]
pub struct DashboardRequest {
    pub state: String,
    pub year: i32,
    pub boom_start_year: i32,
    pub top_n: usize,
    /// Commodities to chart in the area trend panel. Empty = use the
    /// state's current top-N harvested categories.
    pub trend_categories: Vec<String>,
    /// Commodity for the story panel, if requested.
    pub story_commodity: Option<String>,
}

impl DashboardRequest {
    pub fn new(state: impl Into<String>, year: i32) -> Self {
        Self {
            state: state.into(),
            year,
            boom_start_year: year - 5,
            top_n: 10,
            trend_categories: Vec::new(),
            story_commodity: None,
        }
    }
}

/// All panels for one state, ready to serialize for the chart layer.
#[derive(Debug, Clone, Serialize)]
pub struct StateDashboard {
    pub state: String,
    pub year: i32,
    pub top_harvested: Vec<RankedEntry>,
    pub top_revenue: Vec<RankedEntry>,
    pub area_trend: Vec<YearSeriesPoint>,
    pub state_map: BTreeMap<String, f64>,
    pub boom_categories: Vec<GrowthEntry>,
    pub land_use: LandUseTrends,
    pub labor: LaborTrends,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commodity_story: Option<CommodityStory>,
}

/// Filter, deduplicate, and run every panel's pass.
pub fn build_dashboard(
    raw_records: &[Record],
    request: &DashboardRequest,
    peer_config: &PeerConfig,
) -> StateDashboard {
    info!(
        state = %request.state,
        year = request.year,
        raw = raw_records.len(),
        "building dashboard"
    );
    let records = filter::prepare(raw_records);
    debug!(kept = records.len(), "records after filter/dedup");

    let ((top_harvested, top_revenue), (state_map, boom_categories)) = join(
        || {
            join(
                || top_n(&records, request.year, Metric::AreaHarvested, request.top_n),
                || top_n(&records, request.year, Metric::Revenue, request.top_n),
            )
        },
        || {
            join(
                || map_aggregate(&records, request.year, Metric::AreaHarvested),
                || {
                    boom(
                        &records,
                        Metric::AreaHarvested,
                        request.year,
                        request.boom_start_year,
                        request.top_n,
                    )
                },
            )
        },
    );

    let trend_categories: Vec<&str> = if request.trend_categories.is_empty() {
        top_harvested.iter().map(|e| e.category.as_str()).collect()
    } else {
        request.trend_categories.iter().map(String::as_str).collect()
    };

    let ((area_trend, land_use), (labor, story)) = join(
        || {
            join(
                || trend(&records, Metric::AreaHarvested, &trend_categories),
                || land_use_trends(&records),
            )
        },
        || {
            join(
                || labor_trends(&records, &request.state, peer_config),
                || {
                    request
                        .story_commodity
                        .as_deref()
                        .map(|commodity| commodity_story(&records, commodity))
                },
            )
        },
    );

    StateDashboard {
        state: request.state.clone(),
        year: request.year,
        top_harvested,
        top_revenue,
        area_trend,
        state_map,
        boom_categories,
        land_use,
        labor,
        commodity_story: story,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{AggLevel, RawValue, Source};

    fn rec(commodity: &str, stat: &str, unit: &str, year: i32, value: f64) -> Record {
        Record {
            source: Some(Source::Survey),
            sector: Some("CROPS".to_string()),
            commodity: Some(commodity.to_string()),
            statistic_category: Some(stat.to_string()),
            unit: Some(unit.to_string()),
            domain: Some("TOTAL".to_string()),
            aggregation_level: Some(AggLevel::State),
            state_code: Some("IN".to_string()),
            year: Some(year),
            raw_value: RawValue::Number(value),
            ..Default::default()
        }
    }

    fn sample_records() -> Vec<Record> {
        vec![
            rec("CORN", "AREA HARVESTED", "ACRES", 2023, 5_000_000.0),
            rec("CORN", "AREA HARVESTED", "ACRES", 2018, 4_000_000.0),
            rec("CORN", "AREA PLANTED", "ACRES", 2023, 5_200_000.0),
            rec("SOYBEANS", "AREA HARVESTED", "ACRES", 2023, 5_600_000.0),
            rec("SOYBEANS", "AREA HARVESTED", "ACRES", 2018, 5_500_000.0),
            rec("SOYBEANS", "AREA PLANTED", "ACRES", 2023, 5_700_000.0),
            rec("CORN", "SALES", "$", 2023, 4_000_000_000.0),
            rec("LABOR", "WAGE RATE", "$ / HOUR", 2023, 17.2),
        ]
    }

    #[test]
    fn test_full_dashboard_build() {
        let request = DashboardRequest::new("IN", 2023);
        let out = build_dashboard(&sample_records(), &request, &PeerConfig::default());
        assert_eq!(out.state, "IN");
        assert_eq!(out.top_harvested[0].category, "SOYBEANS");
        assert_eq!(out.top_revenue[0].category, "CORN");
        assert!(!out.boom_categories.is_empty());
        assert_eq!(out.land_use.paired_category_count, 2);
        assert_eq!(out.labor.rows.len(), 1);
        assert!(out.commodity_story.is_none());
    }

    #[test]
    fn test_trend_defaults_to_top_harvested() {
        let request = DashboardRequest::new("IN", 2023);
        let out = build_dashboard(&sample_records(), &request, &PeerConfig::default());
        let last = out.area_trend.last().unwrap();
        assert!(last.series.contains_key("CORN"));
        assert!(last.series.contains_key("SOYBEANS"));
    }

    #[test]
    fn test_story_panel_on_request() {
        let mut request = DashboardRequest::new("IN", 2023);
        request.story_commodity = Some("CORN".to_string());
        let out = build_dashboard(&sample_records(), &request, &PeerConfig::default());
        let story = out.commodity_story.expect("story requested");
        assert!(!story.points.is_empty());
    }

    #[test]
    fn test_empty_input_builds_empty_dashboard() {
        let request = DashboardRequest::new("IN", 2023);
        let out = build_dashboard(&[], &request, &PeerConfig::default());
        assert!(out.top_harvested.is_empty());
        assert!(out.state_map.is_empty());
        assert!(out.land_use.points.is_empty());
    }

    #[test]
    fn test_dashboard_serializes() {
        let request = DashboardRequest::new("IN", 2023);
        let out = build_dashboard(&sample_records(), &request, &PeerConfig::default());
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["state"], "IN");
        assert!(json.get("commodity_story").is_none());
    }
}
