//! Export a reconstructed dataset to CSV.
//!
//! One row per sample: `timestamp,value`. Timestamps are RFC 3339 UTC; a gap leaves
//! the value column empty.

use std::path::Path;

use chrono::SecondsFormat;

use crate::domain::Dataset;
use crate::error::AppError;

pub fn write_dataset_csv(path: &Path, dataset: &Dataset) -> Result<(), AppError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| AppError::output(format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writer
        .write_record(["timestamp", "value"])
        .map_err(|e| AppError::output(format!("Failed to write export CSV header: {e}")))?;

    for row in dataset.iter() {
        let value = row.value.map(|v| v.to_string()).unwrap_or_default();
        writer
            .write_record([
                row.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
                value,
            ])
            .map_err(|e| AppError::output(format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::output(format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TimestampedSample;
    use chrono::{TimeZone, Utc};

    #[test]
    fn gaps_export_as_empty_cells() {
        let t0 = Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap();
        let dataset = Dataset::from_rows(vec![
            TimestampedSample { timestamp: t0, value: Some(1.5) },
            TimestampedSample { timestamp: t0 + chrono::TimeDelta::minutes(15), value: None },
        ]);
        let path = std::env::temp_dir().join(format!("genseries_{}_export.csv", std::process::id()));

        write_dataset_csv(&path, &dataset).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "timestamp,value",
                "2015-01-01T00:00:00Z,1.5",
                "2015-01-01T00:15:00Z,",
            ]
        );
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn unwritable_export_is_an_output_error() {
        let path = std::env::temp_dir()
            .join(format!("genseries_{}_no_such_dir", std::process::id()))
            .join("export.csv");
        let err = write_dataset_csv(&path, &Dataset::default()).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_REMOTE);
    }
}
