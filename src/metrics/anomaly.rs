//! Anomaly Detection
//!
//! Flags years whose value falls more than `sensitivity` standard
//! deviations below the series mean. Mean and population stddev are
//! computed over positive values only, so suppressed years (absent) and
//! zero-filled years never drag the baseline down.
//!
//! Each flag carries the mean and threshold used, so callers label charts
//! with exactly the statistics that produced the flag.

use serde::Serialize;

use crate::utils::stats::{mean, population_stddev};

/// A flagged low-outlier year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyFlag {
    pub year: i32,
    pub value: f64,
    pub mean: f64,
    pub threshold: f64,
}

/// Flag points strictly below `mean − sensitivity·stddev`.
///
/// Requires at least 3 positive values; smaller series return no flags
/// rather than unstable statistics.
pub fn detect_anomalies(series: &[(i32, f64)], sensitivity: f64) -> Vec<AnomalyFlag> {
    let positive: Vec<f64> = series
        .iter()
        .map(|(_, v)| *v)
        .filter(|v| *v > 0.0)
        .collect();
    if positive.len() < 3 {
        return Vec::new();
    }

    // Both are Some: positive is non-empty here.
    let Some(m) = mean(&positive) else {
        return Vec::new();
    };
    let Some(sd) = population_stddev(&positive) else {
        return Vec::new();
    };
    let threshold = m - sensitivity * sd;

    series
        .iter()
        .filter(|(_, value)| *value > 0.0 && *value < threshold)
        .map(|(year, value)| AnomalyFlag {
            year: *year,
            value: *value,
            mean: m,
            threshold,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_yield_collapse_year_flagged() {
        let series = [(2018, 150.0), (2019, 160.0), (2020, 40.0), (2021, 155.0)];
        let flags = detect_anomalies(&series, 1.0);
        assert_eq!(flags.len(), 1);
        let flag = &flags[0];
        assert_eq!(flag.year, 2020);
        assert_relative_eq!(flag.value, 40.0);
        assert_relative_eq!(flag.mean, 126.25, epsilon = 1e-9);
        // threshold = mean - stddev; 40 is well below it
        assert!(flag.value < flag.threshold);
        assert_relative_eq!(
            flag.threshold,
            126.25 - 2492.1875_f64.sqrt(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_requires_three_positive_values() {
        assert!(detect_anomalies(&[(2019, 100.0), (2020, 1.0)], 1.0).is_empty());
        assert!(detect_anomalies(&[(2019, 100.0), (2020, 0.0), (2021, 1.0)], 1.0).is_empty());
    }

    #[test]
    fn test_zero_and_negative_points_never_flagged() {
        let series = [
            (2017, 150.0),
            (2018, 160.0),
            (2019, 155.0),
            (2020, 0.0),
            (2021, -5.0),
        ];
        let flags = detect_anomalies(&series, 1.0);
        assert!(flags.iter().all(|f| f.value > 0.0));
    }

    #[test]
    fn test_sensitivity_widens_threshold() {
        let series = [(2018, 150.0), (2019, 160.0), (2020, 40.0), (2021, 155.0)];
        // At 2 sigma the 2020 dip is within tolerance.
        assert!(detect_anomalies(&series, 2.0).is_empty());
    }

    #[test]
    fn test_flat_series_has_no_anomalies() {
        let series = [(2018, 100.0), (2019, 100.0), (2020, 100.0)];
        assert!(detect_anomalies(&series, 1.0).is_empty());
    }
}
