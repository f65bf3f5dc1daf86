//! Typed failures and warnings raised while rebuilding a dataset from segments.
//!
//! None of these abort a run: they are collected per segment and returned next to
//! the dataset (see `align::Diagnostics`).

use std::fmt;

use thiserror::Error;

use super::resolution::Resolution;

/// Structural or parse defect in one timeseries subtree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractionError {
    #[error("segment {index}: missing <{tag}>")]
    MissingElement { index: usize, tag: String },

    #[error("segment {index}: expected exactly one <{tag}>, found {count}")]
    AmbiguousElement {
        index: usize,
        tag: String,
        count: usize,
    },

    #[error("segment {index}: point {point} has no <{tag}>")]
    MissingPointField {
        index: usize,
        point: usize,
        tag: String,
    },

    #[error("segment {index}: <{tag}> value '{value}' is not a YYYY-MM-DDTHH:MMZ timestamp")]
    InvalidTimestamp {
        index: usize,
        tag: String,
        value: String,
    },

    #[error("segment {index}: point {point} quantity '{value}' is not a finite number")]
    InvalidQuantity {
        index: usize,
        point: usize,
        value: String,
    },

    #[error("segment {index}: point {point} position '{value}' {reason}")]
    InvalidPosition {
        index: usize,
        point: usize,
        value: String,
        reason: &'static str,
    },

    #[error("segment {index}: end {end} is not after start {start}")]
    EmptySpan {
        index: usize,
        start: String,
        end: String,
    },
}

impl ExtractionError {
    pub fn segment_index(&self) -> usize {
        match self {
            ExtractionError::MissingElement { index, .. }
            | ExtractionError::AmbiguousElement { index, .. }
            | ExtractionError::MissingPointField { index, .. }
            | ExtractionError::InvalidTimestamp { index, .. }
            | ExtractionError::InvalidQuantity { index, .. }
            | ExtractionError::InvalidPosition { index, .. }
            | ExtractionError::EmptySpan { index, .. } => *index,
        }
    }
}

/// Synthesized timestamps and samples disagree in length.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("segment {index}: {timestamps} timestamps for {samples} samples")]
pub struct MisalignmentError {
    pub index: usize,
    pub timestamps: usize,
    pub samples: usize,
}

/// Any per-segment failure that keeps the segment out of the dataset.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SegmentError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Misalignment(#[from] MisalignmentError),
}

impl SegmentError {
    pub fn segment_index(&self) -> usize {
        match self {
            SegmentError::Extraction(e) => e.segment_index(),
            SegmentError::Misalignment(e) => e.index,
        }
    }
}

/// Why an inferred resolution looks wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionConcern {
    /// The interval is not a whole number of minutes.
    NotWholeMinute,
    /// The provider declared a different resolution next to the points.
    DeclaredMismatch { declared: String },
    /// The provider declared a resolution we could not read.
    UnreadableDeclared { declared: String },
}

/// Non-fatal: the segment is still aligned with the inferred interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuspiciousResolutionWarning {
    pub index: usize,
    pub resolution: Resolution,
    pub concern: ResolutionConcern,
}

impl fmt::Display for SuspiciousResolutionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.concern {
            ResolutionConcern::NotWholeMinute => write!(
                f,
                "segment {}: inferred resolution {} is not a whole number of minutes",
                self.index, self.resolution
            ),
            ResolutionConcern::DeclaredMismatch { declared } => write!(
                f,
                "segment {}: inferred resolution {} disagrees with declared {}",
                self.index, self.resolution, declared
            ),
            ResolutionConcern::UnreadableDeclared { declared } => write!(
                f,
                "segment {}: declared resolution '{}' is unreadable (inferred {})",
                self.index, declared, self.resolution
            ),
        }
    }
}
