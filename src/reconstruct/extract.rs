//! Segment extraction: one timeseries subtree -> one owned `Segment`.
//!
//! Expected shape (tag names come from `DocumentLayout`):
//!
//! ```text
//! <document>
//!   <TimeSeries>            (one per segment, document order)
//!     <Period>              (exactly one)
//!       <timeInterval><start>..</start><end>..</end></timeInterval>
//!       <resolution>PT15M</resolution>      (optional)
//!       <Point><position>1</position><quantity>..</quantity></Point>
//!       ...
//! ```
//!
//! Every parse is explicit: a bad timestamp or quantity is an `ExtractionError`,
//! never a silent `NaN`.
//!
//! Missing points become `None` gaps: skipped positions always, and trailing points
//! of an in-progress segment whenever the declared resolution divides the span.

use chrono::{NaiveDateTime, TimeDelta};

use super::error::ExtractionError;
use super::resolution::parse_iso_duration;
use crate::document::DocNode;
use crate::domain::{Instant, Segment};

/// Provider timestamp text, always UTC.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%MZ";

/// Upper bound on a single point position, so a corrupt value cannot trigger a
/// huge gap allocation. A year at one-minute resolution is ~527k.
pub const MAX_POSITION: usize = 1_000_000;

/// Element names used to walk a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLayout {
    pub timeseries: String,
    pub period: String,
    pub time_interval: String,
    pub start: String,
    pub end: String,
    pub resolution: String,
    pub point: String,
    pub position: String,
    pub quantity: String,
}

impl Default for DocumentLayout {
    fn default() -> Self {
        Self {
            timeseries: "TimeSeries".to_string(),
            period: "Period".to_string(),
            time_interval: "timeInterval".to_string(),
            start: "start".to_string(),
            end: "end".to_string(),
            resolution: "resolution".to_string(),
            point: "Point".to_string(),
            position: "position".to_string(),
            quantity: "quantity".to_string(),
        }
    }
}

/// The timeseries subtrees of a document, in document order.
pub fn timeseries_nodes<'a, N: DocNode>(root: &'a N, layout: &DocumentLayout) -> Vec<&'a N> {
    root.children_named(&layout.timeseries)
}

/// Extract every segment; failures stay in place so indices keep matching the document.
pub fn extract_segments<N: DocNode>(
    root: &N,
    layout: &DocumentLayout,
) -> Vec<Result<Segment, ExtractionError>> {
    timeseries_nodes(root, layout)
        .into_iter()
        .enumerate()
        .map(|(index, node)| extract_segment(index, node, layout))
        .collect()
}

/// Extract the segment held by one timeseries subtree.
///
/// A period with no points at all yields an empty segment (not an error); a point
/// without a quantity is an error.
pub fn extract_segment<N: DocNode>(
    index: usize,
    node: &N,
    layout: &DocumentLayout,
) -> Result<Segment, ExtractionError> {
    let period = exactly_one(index, node, &layout.period)?;

    let interval = period
        .first_child(&layout.time_interval)
        .ok_or_else(|| missing(index, &layout.time_interval))?;
    let start = interval
        .first_child(&layout.start)
        .ok_or_else(|| missing(index, &layout.start))?;
    let end = interval
        .first_child(&layout.end)
        .ok_or_else(|| missing(index, &layout.end))?;

    let start = parse_instant(index, &layout.start, start.text())?;
    let end = parse_instant(index, &layout.end, end.text())?;
    if end <= start {
        return Err(ExtractionError::EmptySpan {
            index,
            start: start.format(TIMESTAMP_FORMAT).to_string(),
            end: end.format(TIMESTAMP_FORMAT).to_string(),
        });
    }

    let declared_resolution = period
        .first_child(&layout.resolution)
        .map(|n| n.text().to_string())
        .filter(|s| !s.is_empty());

    let points = period.children_named(&layout.point);
    let mut samples: Vec<Option<f64>> = Vec::with_capacity(points.len());

    for (offset, point) in points.into_iter().enumerate() {
        let point_no = offset + 1;
        let quantity = point.first_child(&layout.quantity).ok_or_else(|| {
            ExtractionError::MissingPointField {
                index,
                point: point_no,
                tag: layout.quantity.clone(),
            }
        })?;
        let value = parse_quantity(index, point_no, quantity.text())?;

        let slot = match point.first_child(&layout.position) {
            Some(position) => parse_position(index, point_no, position.text())?,
            None => samples.len() + 1,
        };
        if slot <= samples.len() {
            return Err(ExtractionError::InvalidPosition {
                index,
                point: point_no,
                value: slot.to_string(),
                reason: "repeats or goes backwards",
            });
        }
        // Skipped positions are gaps, kept as explicit missing values.
        samples.resize(slot - 1, None);
        samples.push(Some(value));
    }
    pad_trailing_gaps(&mut samples, end - start, declared_resolution.as_deref());

    Ok(Segment {
        start,
        end,
        samples,
        declared_resolution,
    })
}

/// Extend `samples` with gaps up to the slot count implied by the declared resolution.
///
/// Only applies when the declared step is readable and divides `span` exactly, and the
/// segment has at least one point. Otherwise `samples` is left alone and the resolution
/// review reports any disagreement.
fn pad_trailing_gaps(samples: &mut Vec<Option<f64>>, span: TimeDelta, declared: Option<&str>) {
    if samples.is_empty() {
        return;
    }
    let Some(step) = declared.and_then(parse_iso_duration) else {
        return;
    };
    let (Some(span_ns), Some(step_ns)) = (span.num_nanoseconds(), step.num_nanoseconds()) else {
        return;
    };
    if step_ns <= 0 || span_ns % step_ns != 0 {
        return;
    }
    let Ok(slots) = usize::try_from(span_ns / step_ns) else {
        return;
    };
    if slots <= MAX_POSITION && samples.len() < slots {
        samples.resize(slots, None);
    }
}

/// Parse `YYYY-MM-DDTHH:MMZ` into a UTC instant.
pub fn parse_instant(index: usize, tag: &str, text: &str) -> Result<Instant, ExtractionError> {
    NaiveDateTime::parse_from_str(text.trim(), TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| ExtractionError::InvalidTimestamp {
            index,
            tag: tag.to_string(),
            value: text.to_string(),
        })
}

fn parse_quantity(index: usize, point: usize, text: &str) -> Result<f64, ExtractionError> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ExtractionError::InvalidQuantity {
            index,
            point,
            value: text.to_string(),
        })
}

fn parse_position(index: usize, point: usize, text: &str) -> Result<usize, ExtractionError> {
    let invalid = |reason| ExtractionError::InvalidPosition {
        index,
        point,
        value: text.to_string(),
        reason,
    };
    let position: usize = text.trim().parse().map_err(|_| invalid("is not a positive integer"))?;
    if position == 0 {
        return Err(invalid("is not a positive integer"));
    }
    if position > MAX_POSITION {
        return Err(invalid("is out of range"));
    }
    Ok(position)
}

fn exactly_one<'a, N: DocNode>(index: usize, node: &'a N, tag: &str) -> Result<&'a N, ExtractionError> {
    let found = node.children_named(tag);
    match found.as_slice() {
        [one] => Ok(*one),
        [] => Err(missing(index, tag)),
        many => Err(ExtractionError::AmbiguousElement {
            index,
            tag: tag.to_string(),
            count: many.len(),
        }),
    }
}

fn missing(index: usize, tag: &str) -> ExtractionError {
    ExtractionError::MissingElement {
        index,
        tag: tag.to_string(),
    }
}
