//! Reporting utilities: dataset statistics and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{Instant, TimestampedSample};

/// Headline numbers for a set of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStats {
    pub rows: usize,
    pub gaps: usize,
    pub first: Option<Instant>,
    pub last: Option<Instant>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
}

/// Compute stats over rows in any order. Gaps count towards `rows` and `gaps` only.
pub fn summarize(rows: &[TimestampedSample]) -> DatasetStats {
    let mut first: Option<Instant> = None;
    let mut last: Option<Instant> = None;
    let mut min: Option<f64> = None;
    let mut max: Option<f64> = None;
    let mut sum = 0.0;
    let mut valued = 0usize;

    for row in rows {
        first = Some(first.map_or(row.timestamp, |t| t.min(row.timestamp)));
        last = Some(last.map_or(row.timestamp, |t| t.max(row.timestamp)));
        if let Some(v) = row.value {
            min = Some(min.map_or(v, |m| m.min(v)));
            max = Some(max.map_or(v, |m| m.max(v)));
            sum += v;
            valued += 1;
        }
    }

    DatasetStats {
        rows: rows.len(),
        gaps: rows.len() - valued,
        first,
        last,
        min,
        max,
        mean: (valued > 0).then(|| sum / valued as f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone, Utc};

    #[test]
    fn summarize_skips_gaps_for_value_stats() {
        let t0 = Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap();
        let rows = vec![
            TimestampedSample { timestamp: t0 + TimeDelta::hours(1), value: Some(10.0) },
            TimestampedSample { timestamp: t0, value: None },
            TimestampedSample { timestamp: t0 + TimeDelta::hours(2), value: Some(20.0) },
        ];
        let stats = summarize(&rows);
        assert_eq!(stats.rows, 3);
        assert_eq!(stats.gaps, 1);
        assert_eq!(stats.first, Some(t0));
        assert_eq!(stats.last, Some(t0 + TimeDelta::hours(2)));
        assert_eq!(stats.min, Some(10.0));
        assert_eq!(stats.max, Some(20.0));
        assert_eq!(stats.mean, Some(15.0));
    }

    #[test]
    fn summarize_empty() {
        let stats = summarize(&[]);
        assert_eq!(stats.rows, 0);
        assert_eq!(stats.first, None);
        assert_eq!(stats.mean, None);
    }
}
