//! Alignment and concatenation.
//!
//! Each prepared segment pairs its synthesized timestamps with its samples
//! position-for-position. A length mismatch drops the whole segment (never a
//! zip-shortened prefix) and is reported as a `MisalignmentError`. Surviving rows
//! are appended in segment order by a single writer.

use tracing::{debug, warn};

use super::error::{ExtractionError, MisalignmentError, SegmentError, SuspiciousResolutionWarning};
use super::resolution::Resolution;
use crate::domain::{Dataset, Instant, Segment, TimestampedSample};

/// A segment with its inferred resolution and synthesized timestamps, ready to align.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSegment {
    pub index: usize,
    pub segment: Segment,
    /// `None` for zero-sample segments.
    pub resolution: Option<Resolution>,
    pub timestamps: Vec<Instant>,
    pub warnings: Vec<SuspiciousResolutionWarning>,
}

/// What happened to one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentStatus {
    Included { rows: usize },
    Empty,
    ExtractionFailed,
    Misaligned,
}

impl SegmentStatus {
    pub fn label(self) -> &'static str {
        match self {
            SegmentStatus::Included { .. } => "ok",
            SegmentStatus::Empty => "empty",
            SegmentStatus::ExtractionFailed => "extraction failed",
            SegmentStatus::Misaligned => "misaligned",
        }
    }
}

/// Per-segment line for reports and debug bundles.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentSummary {
    pub index: usize,
    pub start: Option<Instant>,
    pub end: Option<Instant>,
    pub samples: usize,
    pub resolution: Option<Resolution>,
    pub warnings: usize,
    pub status: SegmentStatus,
}

/// Everything reported next to the dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    pub segments: Vec<SegmentSummary>,
    /// Zero-length segments (normal, not errors).
    pub skipped_empty: usize,
    /// Segments that raised at least one resolution warning.
    pub warned_segments: usize,
    pub warnings: Vec<SuspiciousResolutionWarning>,
    pub errors: Vec<SegmentError>,
}

impl Diagnostics {
    pub fn included_segments(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s.status, SegmentStatus::Included { .. }))
            .count()
    }

    pub fn failed_segments(&self) -> usize {
        self.errors.len()
    }
}

/// Final output of a reconstruction run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconstruction {
    pub dataset: Dataset,
    pub diagnostics: Diagnostics,
}

impl Reconstruction {
    /// True when every segment made it into the dataset (empty ones count as fine).
    pub fn is_complete(&self) -> bool {
        self.diagnostics.errors.is_empty()
    }
}

/// Pair one segment's timestamps with its samples.
pub fn align_segment(
    index: usize,
    samples: &[Option<f64>],
    timestamps: &[Instant],
) -> Result<Vec<TimestampedSample>, MisalignmentError> {
    if samples.len() != timestamps.len() {
        return Err(MisalignmentError {
            index,
            timestamps: timestamps.len(),
            samples: samples.len(),
        });
    }
    Ok(timestamps
        .iter()
        .zip(samples)
        .map(|(&timestamp, &value)| TimestampedSample { timestamp, value })
        .collect())
}

/// Align every prepared segment and concatenate in the order given.
pub fn concatenate(prepared: Vec<Result<PreparedSegment, ExtractionError>>) -> Reconstruction {
    let mut dataset = Dataset::default();
    let mut diagnostics = Diagnostics::default();

    for item in prepared {
        let prepared = match item {
            Ok(prepared) => prepared,
            Err(err) => {
                warn!(segment = err.segment_index(), error = %err, "segment extraction failed");
                diagnostics.segments.push(SegmentSummary {
                    index: err.segment_index(),
                    start: None,
                    end: None,
                    samples: 0,
                    resolution: None,
                    warnings: 0,
                    status: SegmentStatus::ExtractionFailed,
                });
                diagnostics.errors.push(err.into());
                continue;
            }
        };

        let PreparedSegment {
            index,
            segment,
            resolution,
            timestamps,
            warnings,
        } = prepared;

        if !warnings.is_empty() {
            diagnostics.warned_segments += 1;
            for w in &warnings {
                warn!(segment = index, "{w}");
            }
        }

        let status = if segment.samples.is_empty() {
            debug!(segment = index, "empty segment skipped");
            diagnostics.skipped_empty += 1;
            SegmentStatus::Empty
        } else {
            match align_segment(index, &segment.samples, &timestamps) {
                Ok(rows) => {
                    let status = SegmentStatus::Included { rows: rows.len() };
                    dataset.extend(rows);
                    status
                }
                Err(err) => {
                    warn!(segment = index, error = %err, "segment dropped");
                    diagnostics.errors.push(err.into());
                    SegmentStatus::Misaligned
                }
            }
        };

        diagnostics.segments.push(SegmentSummary {
            index,
            start: Some(segment.start),
            end: Some(segment.end),
            samples: segment.samples.len(),
            resolution,
            warnings: warnings.len(),
            status,
        });
        diagnostics.warnings.extend(warnings);
    }

    Reconstruction {
        dataset,
        diagnostics,
    }
}
