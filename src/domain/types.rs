//! Shared domain types.
//!
//! These types are intentionally kept small and owned so they can be:
//!
//! - produced by the reconstruction core without borrowing from the parsed document
//! - exported to JSON/CSV
//! - reloaded later for inspection

use std::path::PathBuf;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// All instants in this crate are UTC; the provider never sends offsets.
pub type Instant = DateTime<Utc>;

/// Longest window the provider accepts in a single request.
pub const MAX_WINDOW_DAYS: i64 = 366;

/// Requested time window, half-open `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestWindow {
    pub start: Instant,
    pub end: Instant,
}

impl RequestWindow {
    /// Build a window, rejecting empty/inverted spans and spans longer than a year.
    pub fn new(start: Instant, end: Instant) -> Result<Self, AppError> {
        if end <= start {
            return Err(AppError::input(format!(
                "Window end {end} must be after start {start}."
            )));
        }
        if end - start > TimeDelta::days(MAX_WINDOW_DAYS) {
            return Err(AppError::input(format!(
                "Window {start} .. {end} exceeds the provider limit of {MAX_WINDOW_DAYS} days."
            )));
        }
        Ok(Self { start, end })
    }
}

/// Provider query codes.
///
/// Codes are passed through verbatim; nothing here checks that `A75` is a real
/// document type or that a domain EIC exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    pub document_type: String,
    pub process_type: String,
    pub psr_type: Option<String>,
    pub domain: String,
}

/// One provider-returned sub-series.
///
/// `samples` keeps provider order; a `None` marks a gap (a skipped point position),
/// never a dropped value.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub start: Instant,
    pub end: Instant,
    pub samples: Vec<Option<f64>>,
    /// Resolution text declared by the provider next to the points, if any (e.g. `PT15M`).
    pub declared_resolution: Option<String>,
}

impl Segment {
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

/// The unit of the final dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimestampedSample {
    pub timestamp: Instant,
    pub value: Option<f64>,
}

/// Ordered concatenation of every segment's rows.
///
/// Rows are kept in segment order as returned by the provider. Overlapping segments
/// produce duplicate timestamps; resolving them is left to the consumer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    rows: Vec<TimestampedSample>,
}

impl Dataset {
    pub fn from_rows(rows: Vec<TimestampedSample>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[TimestampedSample] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimestampedSample> {
        self.rows.iter()
    }

    /// Earliest and latest timestamp present (rows are not assumed sorted).
    pub fn time_range(&self) -> Option<(Instant, Instant)> {
        let first = self.rows.first()?.timestamp;
        Some(self.rows.iter().fold((first, first), |(lo, hi), row| {
            (lo.min(row.timestamp), hi.max(row.timestamp))
        }))
    }

    /// Number of rows whose value is missing.
    pub fn gap_count(&self) -> usize {
        self.rows.iter().filter(|r| r.value.is_none()).count()
    }

    pub(crate) fn extend(&mut self, rows: Vec<TimestampedSample>) {
        self.rows.extend(rows);
    }
}

/// Where a run's document came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RunSource {
    Remote {
        query: QueryParams,
        window: RequestWindow,
    },
    File {
        path: PathBuf,
    },
}

impl RunSource {
    pub fn describe(&self) -> String {
        match self {
            RunSource::Remote { query, window } => format!(
                "{} / {} / {} / {} [{} .. {})",
                query.document_type,
                query.process_type,
                query.psr_type.as_deref().unwrap_or("all"),
                query.domain,
                window.start.format("%Y-%m-%dT%H:%MZ"),
                window.end.format("%Y-%m-%dT%H:%MZ"),
            ),
            RunSource::File { path } => format!("file {}", path.display()),
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub source: RunSource,
    /// Process segments on the rayon pool (results are merged in segment order either way).
    pub parallel: bool,
    /// Number of dataset rows echoed to the terminal.
    pub head: usize,
    pub save_raw: Option<PathBuf>,
    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
    pub debug: bool,
}

/// A saved dataset file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetFile {
    pub tool: String,
    pub generated_at: Instant,
    pub source: RunSource,
    pub rows: Vec<TimestampedSample>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> Instant {
        Utc.with_ymd_and_hms(2015, 1, 1, h, m, 0).unwrap()
    }

    #[test]
    fn window_rejects_inverted_and_oversized_spans() {
        assert!(RequestWindow::new(at(1, 0), at(0, 0)).is_err());
        assert!(RequestWindow::new(at(0, 0), at(0, 0)).is_err());

        let start = at(0, 0);
        let too_long = start + TimeDelta::days(MAX_WINDOW_DAYS + 1);
        let err = RequestWindow::new(start, too_long).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let leap_year = start + TimeDelta::days(MAX_WINDOW_DAYS);
        assert!(RequestWindow::new(start, leap_year).is_ok());
    }

    #[test]
    fn time_range_does_not_assume_sorted_rows() {
        let ds = Dataset::from_rows(vec![
            TimestampedSample { timestamp: at(2, 0), value: Some(1.0) },
            TimestampedSample { timestamp: at(0, 0), value: None },
            TimestampedSample { timestamp: at(1, 0), value: Some(3.0) },
        ]);
        assert_eq!(ds.time_range(), Some((at(0, 0), at(2, 0))));
        assert_eq!(ds.gap_count(), 1);
        assert!(Dataset::default().time_range().is_none());
    }
}
