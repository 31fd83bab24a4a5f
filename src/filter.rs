//! Record Filtering and Deduplication
//!
//! The survey and census programs overlap: both can report the same fact for
//! the same (state, year, commodity, statistic, unit) key, and census exports
//! additionally carry sub-domain breakdowns and aggregate "TOTAL" commodities
//! that would double-count everything downstream.
//!
//! `prepare` applies the inclusion rules and then resolves provenance
//! overlap, producing the one collection every analytics pass consumes.
//! An empty input yields an empty output; nothing here can fail.

use ahash::AHashMap;

use crate::record::{Record, DOMAIN_TOTAL, FARM_OPERATIONS};

/// Composite identity of one logical observation.
type ObservationKey = (
    Option<String>, // state_code
    Option<i32>,    // year
    Option<String>, // commodity
    Option<String>, // statistic_category
    Option<String>, // unit
);

fn observation_key(rec: &Record) -> ObservationKey {
    (
        rec.state_code.clone(),
        rec.year,
        rec.commodity.clone(),
        rec.statistic_category.clone(),
        rec.unit.clone(),
    )
}

/// Commodity labels that denote aggregate totals rather than a single crop.
fn is_aggregate_commodity(commodity: &str) -> bool {
    let upper = commodity.to_ascii_uppercase();
    upper.contains("TOTAL") || upper.contains("ALL CLASSES")
}

/// Rule 1: which provenances are allowed through.
///
/// Census rows are only admitted for the FARM OPERATIONS bookkeeping
/// commodity and for dollar SALES, where the census is the only program
/// reporting revenue.
fn provenance_allowed(rec: &Record) -> bool {
    if rec.source.is_none() || rec.is_survey() {
        return true;
    }
    if rec
        .commodity
        .as_deref()
        .map_or(false, |c| c.eq_ignore_ascii_case(FARM_OPERATIONS))
    {
        return true;
    }
    rec.has_statistic("SALES") && rec.is_dollar_unit()
}

/// Rule 3: canonical domain only. Sub-domain breakdowns (organic status,
/// size classes, ...) repeat the TOTAL figure in pieces.
fn domain_allowed(rec: &Record) -> bool {
    match rec.domain.as_deref() {
        None => true,
        Some(d) => d.eq_ignore_ascii_case(DOMAIN_TOTAL),
    }
}

/// Filter and deduplicate the raw record collection.
///
/// Applied in order: provenance rules, aggregate-commodity drop, domain
/// restriction, then SURVEY-over-CENSUS dedup per observation key. Census
/// rows are discarded only from keys where a survey row also survives.
pub fn prepare(records: &[Record]) -> Vec<Record> {
    let filtered: Vec<&Record> = records
        .iter()
        .filter(|r| provenance_allowed(r))
        .filter(|r| {
            r.commodity
                .as_deref()
                .map_or(true, |c| !is_aggregate_commodity(c))
        })
        .filter(|r| domain_allowed(r))
        .collect();

    // First pass: which keys have survey coverage.
    let mut survey_keys: AHashMap<ObservationKey, ()> = AHashMap::new();
    for rec in &filtered {
        if rec.is_survey() {
            survey_keys.insert(observation_key(rec), ());
        }
    }

    filtered
        .into_iter()
        .filter(|r| !(r.is_census() && survey_keys.contains_key(&observation_key(r))))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{RawValue, Source};

    fn record(source: Option<Source>, commodity: &str, stat: &str, unit: &str) -> Record {
        Record {
            source,
            commodity: Some(commodity.to_string()),
            statistic_category: Some(stat.to_string()),
            unit: Some(unit.to_string()),
            state_code: Some("IN".to_string()),
            year: Some(2022),
            raw_value: RawValue::Number(100.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert!(prepare(&[]).is_empty());
    }

    #[test]
    fn test_survey_beats_census_on_same_key() {
        // Dollar SALES is the one statistic where census rows survive rule 1,
        // so it is where provenance overlap actually happens.
        let survey_sales = record(Some(Source::Survey), "CORN", "SALES", "$");
        let census_sales = record(Some(Source::Census), "CORN", "SALES", "$");

        let out = prepare(&[survey_sales.clone(), census_sales]);
        assert_eq!(out, vec![survey_sales]);
    }

    #[test]
    fn test_census_sales_kept_when_no_survey_overlap() {
        let census_sales = record(Some(Source::Census), "SOYBEANS", "SALES", "$");
        let out = prepare(&[census_sales.clone()]);
        assert_eq!(out, vec![census_sales]);
    }

    #[test]
    fn test_census_non_sales_dropped() {
        let census_area = record(Some(Source::Census), "SOYBEANS", "AREA PLANTED", "ACRES");
        assert!(prepare(&[census_area]).is_empty());
    }

    #[test]
    fn test_census_farm_operations_kept() {
        let ops = record(Some(Source::Census), "FARM OPERATIONS", "OPERATIONS", "OPERATIONS");
        assert_eq!(prepare(&[ops]).len(), 1);
    }

    #[test]
    fn test_untagged_provenance_kept() {
        let rec = record(None, "HAY", "AREA HARVESTED", "ACRES");
        assert_eq!(prepare(&[rec]).len(), 1);
    }

    #[test]
    fn test_aggregate_commodities_dropped() {
        for label in ["FIELD CROPS, TOTAL", "CROPS, TOTAL", "WHEAT, ALL CLASSES"] {
            let rec = record(Some(Source::Survey), label, "AREA PLANTED", "ACRES");
            assert!(prepare(&[rec]).is_empty(), "label {label:?}");
        }
    }

    #[test]
    fn test_sub_domain_rows_dropped() {
        let mut canonical = record(Some(Source::Survey), "CORN", "AREA PLANTED", "ACRES");
        canonical.domain = Some("TOTAL".to_string());
        let mut organic = canonical.clone();
        organic.domain = Some("ORGANIC STATUS".to_string());

        let out = prepare(&[canonical.clone(), organic]);
        assert_eq!(out, vec![canonical]);
    }

    #[test]
    fn test_dedup_keys_differ_by_unit() {
        // Same fact in different units is two logical observations.
        let survey_dollars = record(Some(Source::Survey), "CORN", "SALES", "$");
        let census_per_cwt = record(Some(Source::Census), "CORN", "SALES", "$ / CWT");
        let out = prepare(&[survey_dollars, census_per_cwt]);
        assert_eq!(out.len(), 2);
    }
}
