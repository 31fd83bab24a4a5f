//! Record loading
//!
//! Reads NASS QuickStats extracts (per-state parquet partitions or the raw
//! CSV download) into typed `Record`s with Polars. Only the columns the
//! engine consumes are projected; everything else in the extract is
//! ignored.

use std::path::Path;

use polars::prelude::*;
use thiserror::Error;
use tracing::info;

use crate::record::{AggLevel, RawValue, Record, Source};

/// Columns projected from a QuickStats extract, in `Record` field order.
const COLUMNS: [&str; 11] = [
    "source_desc",
    "sector_desc",
    "group_desc",
    "commodity_desc",
    "statisticcat_desc",
    "unit_desc",
    "domain_desc",
    "agg_level_desc",
    "state_alpha",
    "year",
    "Value",
];

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: PolarsError,
    },
    #[error("column '{0}' missing or mistyped in extract")]
    Schema(&'static str),
}

/// Load one per-state parquet partition.
pub fn load_parquet(path: &Path) -> Result<Vec<Record>, DataError> {
    let df = LazyFrame::scan_parquet(path, Default::default())
        .map_err(|source| DataError::Read {
            path: path.display().to_string(),
            source,
        })?
        .select(projection())
        .collect()
        .map_err(|source| DataError::Read {
            path: path.display().to_string(),
            source,
        })?;
    let records = frame_to_records(&df)?;
    info!(path = %path.display(), rows = records.len(), "loaded parquet extract");
    Ok(records)
}

/// Load a raw QuickStats CSV download.
pub fn load_csv(path: &Path) -> Result<Vec<Record>, DataError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.into()))
        .map_err(|source| DataError::Read {
            path: path.display().to_string(),
            source,
        })?
        .finish()
        .map_err(|source| DataError::Read {
            path: path.display().to_string(),
            source,
        })?
        .lazy()
        .select(projection())
        .collect()
        .map_err(|source| DataError::Read {
            path: path.display().to_string(),
            source,
        })?;
    let records = frame_to_records(&df)?;
    info!(path = %path.display(), rows = records.len(), "loaded CSV extract");
    Ok(records)
}

fn projection() -> Vec<Expr> {
    let mut exprs: Vec<Expr> = COLUMNS
        .iter()
        .filter(|c| **c != "year" && **c != "Value")
        .map(|c| col(*c).cast(DataType::String))
        .collect();
    exprs.push(col("year").cast(DataType::Int32));
    // Value keeps its raw text: suppression codes parse downstream.
    exprs.push(col("Value").cast(DataType::String));
    exprs
}

fn str_col<'a>(df: &'a DataFrame, name: &'static str) -> Result<&'a StringChunked, DataError> {
    df.column(name)
        .map_err(|_| DataError::Schema(name))?
        .str()
        .map_err(|_| DataError::Schema(name))
}

fn frame_to_records(df: &DataFrame) -> Result<Vec<Record>, DataError> {
    let source = str_col(df, "source_desc")?;
    let sector = str_col(df, "sector_desc")?;
    let group = str_col(df, "group_desc")?;
    let commodity = str_col(df, "commodity_desc")?;
    let statistic = str_col(df, "statisticcat_desc")?;
    let unit = str_col(df, "unit_desc")?;
    let domain = str_col(df, "domain_desc")?;
    let agg_level = str_col(df, "agg_level_desc")?;
    let state = str_col(df, "state_alpha")?;
    let year = df
        .column("year")
        .map_err(|_| DataError::Schema("year"))?
        .i32()
        .map_err(|_| DataError::Schema("year"))?;
    let value = str_col(df, "Value")?;

    let owned = |opt: Option<&str>| opt.map(str::to_string);
    let mut records = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        records.push(Record {
            source: source.get(idx).map(|s| Source::from(s.to_string())),
            sector: owned(sector.get(idx)),
            group: owned(group.get(idx)),
            commodity: owned(commodity.get(idx)),
            statistic_category: owned(statistic.get(idx)),
            unit: owned(unit.get(idx)),
            domain: owned(domain.get(idx)),
            aggregation_level: agg_level.get(idx).map(|s| AggLevel::from(s.to_string())),
            state_code: owned(state.get(idx)),
            year: year.get(idx),
            raw_value: match value.get(idx) {
                Some(text) => RawValue::Text(text.to_string()),
                None => RawValue::Missing,
            },
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_covers_record_schema() {
        assert_eq!(projection().len(), COLUMNS.len());
    }

    #[test]
    #[ignore] // Requires a QuickStats extract on disk
    fn test_load_parquet_extract() {
        let records =
            load_parquet(Path::new("data/states/IN.parquet")).expect("failed to load extract");
        assert!(!records.is_empty());
        assert!(records.iter().any(|r| r.year.is_some()));
    }
}
