//! Debug bundle writer for inspecting a run's request and per-segment outcome.

use std::fs::{File, create_dir_all};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, SecondsFormat};

use crate::data::RequestDescriptor;
use crate::domain::RunSource;
use crate::error::AppError;
use crate::reconstruct::Reconstruction;

/// Rows copied into the bundle, from the head of the dataset.
const SAMPLE_ROWS: usize = 24;

pub fn write_debug_bundle(
    dir: &Path,
    source: &RunSource,
    request: Option<&RequestDescriptor>,
    reconstruction: &Reconstruction,
) -> Result<PathBuf, AppError> {
    create_dir_all(dir).map_err(|e| AppError::output(format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("genseries_debug_{ts}.md"));

    let file = File::create(&path)
        .map_err(|e| AppError::output(format!("Failed to create debug file: {e}")))?;
    let mut file = BufWriter::new(file);

    let diag = &reconstruction.diagnostics;
    let dataset = &reconstruction.dataset;

    writeln!(file, "# genseries debug bundle").map_err(write_err)?;
    writeln!(file, "- generated: {}", Local::now().to_rfc3339()).map_err(write_err)?;
    writeln!(file, "- source: {}", source.describe()).map_err(write_err)?;
    writeln!(
        file,
        "- rows: {} (gaps: {})",
        dataset.len(),
        dataset.gap_count()
    )
    .map_err(write_err)?;
    if let Some((first, last)) = dataset.time_range() {
        writeln!(
            file,
            "- range: {} .. {}",
            first.to_rfc3339_opts(SecondsFormat::Secs, true),
            last.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
        .map_err(write_err)?;
    }
    writeln!(
        file,
        "- segments: {} (included {}, empty {}, failed {}, warned {})",
        diag.segments.len(),
        diag.included_segments(),
        diag.skipped_empty,
        diag.failed_segments(),
        diag.warned_segments
    )
    .map_err(write_err)?;

    if let Some(request) = request {
        writeln!(file, "\n## Request").map_err(write_err)?;
        writeln!(file, "| parameter | value |").map_err(write_err)?;
        writeln!(file, "| - | - |").map_err(write_err)?;
        for (k, v) in &request.params {
            writeln!(file, "| {k} | {v} |").map_err(write_err)?;
        }
    }

    writeln!(file, "\n## Segments").map_err(write_err)?;
    writeln!(file, "| # | start | end | samples | interval | warnings | status |").map_err(write_err)?;
    writeln!(file, "| - | - | - | - | - | - | - |").map_err(write_err)?;
    for s in &diag.segments {
        writeln!(
            file,
            "| {} | {} | {} | {} | {} | {} | {} |",
            s.index,
            s.start.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true)).unwrap_or_else(|| "-".to_string()),
            s.end.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true)).unwrap_or_else(|| "-".to_string()),
            s.samples,
            s.resolution.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string()),
            s.warnings,
            s.status.label()
        )
        .map_err(write_err)?;
    }

    if !diag.warnings.is_empty() {
        writeln!(file, "\n## Warnings").map_err(write_err)?;
        for w in &diag.warnings {
            writeln!(file, "- {w}").map_err(write_err)?;
        }
    }
    if !diag.errors.is_empty() {
        writeln!(file, "\n## Errors").map_err(write_err)?;
        for e in &diag.errors {
            writeln!(file, "- {e}").map_err(write_err)?;
        }
    }

    writeln!(file, "\n## First rows").map_err(write_err)?;
    writeln!(file, "| timestamp | value |").map_err(write_err)?;
    writeln!(file, "| - | - |").map_err(write_err)?;
    for row in dataset.iter().take(SAMPLE_ROWS) {
        writeln!(
            file,
            "| {} | {} |",
            row.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            row.value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
        )
        .map_err(write_err)?;
    }

    file.flush().map_err(write_err)?;
    Ok(path)
}

fn write_err(e: std::io::Error) -> AppError {
    AppError::output(format!("Failed to write debug bundle: {e}"))
}
