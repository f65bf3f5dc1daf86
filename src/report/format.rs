//! Formatted terminal output.
//!
//! Formatting lives here so the pipeline and the reconstruction core never touch
//! presentation, and output changes stay in one file.

use chrono::SecondsFormat;

use crate::domain::{DatasetFile, Instant, RunSource, TimestampedSample};
use crate::reconstruct::{Diagnostics, Reconstruction};
use crate::report::{DatasetStats, summarize};

/// Format the run summary (source, row stats, segment counts).
pub fn format_run_summary(source: &RunSource, reconstruction: &Reconstruction) -> String {
    let mut out = String::new();
    let diag = &reconstruction.diagnostics;

    out.push_str("=== genseries - generation time series ===\n");
    out.push_str(&format!("Source: {}\n", source.describe()));
    out.push_str(&format_stats(&summarize(reconstruction.dataset.rows())));
    out.push_str(&format!(
        "Segments: total={} included={} empty={} failed={} warned={}\n",
        diag.segments.len(),
        diag.included_segments(),
        diag.skipped_empty,
        diag.failed_segments(),
        diag.warned_segments,
    ));
    out.push('\n');

    out
}

/// Format the per-segment table.
pub fn format_segment_table(diag: &Diagnostics) -> String {
    let mut out = String::new();
    out.push_str("Segments:\n");
    out.push_str(
        format!(
            "{:>5} {:<17} {:<17} {:>8} {:>10} {:>5} {:<18}\n",
            "#", "start", "end", "samples", "interval", "warn", "status"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:->5} {:-<17} {:-<17} {:->8} {:->10} {:->5} {:-<18}\n",
            "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for s in &diag.segments {
        out.push_str(
            format!(
                "{:>5} {:<17} {:<17} {:>8} {:>10} {:>5} {:<18}\n",
                s.index,
                s.start.map(fmt_short).unwrap_or_else(|| "-".to_string()),
                s.end.map(fmt_short).unwrap_or_else(|| "-".to_string()),
                s.samples,
                s.resolution.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string()),
                s.warnings,
                s.status.label(),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Format warnings and per-segment errors. Empty when there is nothing to say.
pub fn format_issues(diag: &Diagnostics) -> String {
    let mut out = String::new();

    if !diag.warnings.is_empty() {
        out.push_str(&format!("Warnings ({}):\n", diag.warnings.len()));
        for w in &diag.warnings {
            out.push_str(&format!("- {w}\n"));
        }
    }
    if !diag.errors.is_empty() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("Segment errors ({}):\n", diag.errors.len()));
        for e in &diag.errors {
            out.push_str(&format!("- {e}\n"));
        }
    }

    out
}

/// Format the first `head` rows.
pub fn format_rows(rows: &[TimestampedSample], head: usize) -> String {
    let mut out = String::new();
    if head == 0 || rows.is_empty() {
        return out;
    }

    let shown = head.min(rows.len());
    out.push_str(&format!("First {shown} of {} rows:\n", rows.len()));
    out.push_str(format!("{:<22} {:>14}\n", "timestamp", "value").trim_end());
    out.push('\n');
    for row in rows.iter().take(shown) {
        out.push_str(
            format!(
                "{:<22} {:>14}\n",
                row.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
                fmt_value(row.value)
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Format a reloaded dataset file (`inspect`).
pub fn format_dataset_file(file: &DatasetFile, head: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {} dataset ===\n", file.tool));
    out.push_str(&format!(
        "Generated: {}\n",
        file.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    ));
    out.push_str(&format!("Source: {}\n", file.source.describe()));
    out.push_str(&format_stats(&summarize(&file.rows)));
    out.push('\n');
    out.push_str(&format_rows(&file.rows, head));
    out
}

fn format_stats(stats: &DatasetStats) -> String {
    let mut out = format!("Rows: n={} | gaps={}\n", stats.rows, stats.gaps);
    if let (Some(first), Some(last)) = (stats.first, stats.last) {
        out.push_str(&format!("Range: {} .. {}\n", fmt_short(first), fmt_short(last)));
    }
    if let (Some(min), Some(max), Some(mean)) = (stats.min, stats.max, stats.mean) {
        out.push_str(&format!("Values: min={min:.2} max={max:.2} mean={mean:.2}\n"));
    }
    out
}

fn fmt_short(t: Instant) -> String {
    t.format("%Y-%m-%dT%H:%MZ").to_string()
}

fn fmt_value(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v:.3}"),
        None => "-".to_string(),
    }
}
