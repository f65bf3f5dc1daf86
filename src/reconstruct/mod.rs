//! Segment reconstruction: document tree -> one uniformly timestamped dataset.
//!
//! Per segment, independently of every other segment:
//!
//! 1. `extract`     - timeseries subtree -> `Segment` (start, end, samples)
//! 2. `resolution`  - (start, end, n) -> interval, plus sanity warnings
//! 3. `timestamps`  - (start, interval, n) -> n instants
//!
//! then `align` pairs and concatenates in document order. Steps 1-3 may run on the
//! rayon pool; the indexed `collect` keeps document order, so the result is the same
//! either way.

pub mod align;
pub mod error;
pub mod extract;
pub mod resolution;
pub mod timestamps;

use rayon::prelude::*;
use tracing::debug;

use crate::document::DocNode;
use crate::domain::Segment;

pub use align::{
    Diagnostics, PreparedSegment, Reconstruction, SegmentStatus, SegmentSummary, align_segment,
    concatenate,
};
pub use error::{
    ExtractionError, MisalignmentError, ResolutionConcern, SegmentError,
    SuspiciousResolutionWarning,
};
pub use extract::{DocumentLayout, extract_segment, extract_segments};
pub use resolution::{Resolution, infer_interval, infer_resolution, review_resolution};
pub use timestamps::synthesize_timestamps;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconstructOptions {
    pub layout: DocumentLayout,
    pub parallel: bool,
}

impl Default for ReconstructOptions {
    fn default() -> Self {
        Self {
            layout: DocumentLayout::default(),
            parallel: true,
        }
    }
}

/// Rebuild the dataset held by `root`.
///
/// Never fails as a whole: per-segment errors and warnings land in
/// `Reconstruction::diagnostics`.
pub fn reconstruct<N: DocNode + Sync>(root: &N, options: &ReconstructOptions) -> Reconstruction {
    let nodes = extract::timeseries_nodes(root, &options.layout);
    debug!(segments = nodes.len(), parallel = options.parallel, "reconstructing");

    let prepared: Vec<Result<PreparedSegment, ExtractionError>> = if options.parallel {
        nodes
            .par_iter()
            .enumerate()
            .map(|(index, node)| prepare_segment(index, *node, &options.layout))
            .collect()
    } else {
        nodes
            .iter()
            .enumerate()
            .map(|(index, node)| prepare_segment(index, *node, &options.layout))
            .collect()
    };

    concatenate(prepared)
}

/// Extract one subtree and synthesize its timestamps.
pub fn prepare_segment<N: DocNode>(
    index: usize,
    node: &N,
    layout: &DocumentLayout,
) -> Result<PreparedSegment, ExtractionError> {
    let segment = extract_segment(index, node, layout)?;
    Ok(synthesize_segment(index, segment))
}

/// Infer the resolution of an already extracted segment and lay out its timestamps.
pub fn synthesize_segment(index: usize, segment: Segment) -> PreparedSegment {
    let inferred = infer_resolution(&segment);
    let (timestamps, warnings) = match inferred {
        Some(r) => (
            synthesize_timestamps(segment.start, r, segment.sample_count()),
            review_resolution(index, &segment, r),
        ),
        None => (Vec::new(), Vec::new()),
    };

    debug!(
        segment = index,
        samples = segment.sample_count(),
        resolution = ?inferred.map(|r| r.to_string()),
        "segment prepared"
    );

    PreparedSegment {
        index,
        segment,
        resolution: inferred,
        timestamps,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::XmlNode;
    use chrono::{TimeDelta, TimeZone, Utc};

    fn series(start: &str, end: &str, quantities: &[&str]) -> XmlNode {
        let interval = XmlNode::element("timeInterval")
            .with_child(XmlNode::element("start").with_text(start))
            .with_child(XmlNode::element("end").with_text(end));
        let mut period = XmlNode::element("Period").with_child(interval);
        for (i, q) in quantities.iter().enumerate() {
            period = period.with_child(
                XmlNode::element("Point")
                    .with_child(XmlNode::element("position").with_text((i + 1).to_string()))
                    .with_child(XmlNode::element("quantity").with_text(*q)),
            );
        }
        XmlNode::element("TimeSeries").with_child(period)
    }

    fn document(series: Vec<XmlNode>) -> XmlNode {
        series
            .into_iter()
            .fold(XmlNode::element("GL_MarketDocument"), |doc, s| doc.with_child(s))
    }

    #[test]
    fn quarter_hours_round_trip() {
        let doc = document(vec![series(
            "2015-01-01T00:00Z",
            "2015-01-01T01:00Z",
            &["1", "2", "3", "4"],
        )]);
        let out = reconstruct(&doc, &ReconstructOptions::default());

        let minutes: Vec<u32> = out
            .dataset
            .iter()
            .map(|r| chrono::Timelike::minute(&r.timestamp))
            .collect();
        assert_eq!(minutes, vec![0, 15, 30, 45]);
        assert!(out.is_complete());
    }

    #[test]
    fn valid_segment_survives_a_malformed_neighbour() {
        // Second point carries a position but no quantity.
        let template = series("2015-01-01T01:00Z", "2015-01-01T02:00Z", &["1"]);
        let period = template.children()[0].clone().with_child(
            XmlNode::element("Point").with_child(XmlNode::element("position").with_text("2")),
        );
        let broken = XmlNode::element("TimeSeries").with_child(period);
        let doc = document(vec![
            series("2015-01-01T00:00Z", "2015-01-01T01:00Z", &["1", "2", "3", "4"]),
            broken,
        ]);

        let out = reconstruct(&doc, &ReconstructOptions::default());
        assert_eq!(out.dataset.len(), 4);
        assert_eq!(out.diagnostics.errors.len(), 1);
        assert_eq!(out.diagnostics.errors[0].segment_index(), 1);
        assert!(matches!(
            out.diagnostics.errors[0],
            SegmentError::Extraction(ExtractionError::MissingPointField { point: 2, .. })
        ));
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let start = Utc.with_ymd_and_hms(2020, 6, 1, 0, 0, 0).unwrap();
        let series_list: Vec<XmlNode> = (0..40)
            .rev()
            .map(|day| {
                let s = start + TimeDelta::days(day);
                let e = s + TimeDelta::days(1);
                let quantities: Vec<String> = (0..24).map(|h| (day * 100 + h).to_string()).collect();
                let refs: Vec<&str> = quantities.iter().map(String::as_str).collect();
                series(
                    &s.format("%Y-%m-%dT%H:%MZ").to_string(),
                    &e.format("%Y-%m-%dT%H:%MZ").to_string(),
                    &refs,
                )
            })
            .collect();
        let doc = document(series_list);

        let par = reconstruct(&doc, &ReconstructOptions::default());
        let seq = reconstruct(
            &doc,
            &ReconstructOptions {
                parallel: false,
                ..ReconstructOptions::default()
            },
        );
        assert_eq!(par, seq);
        assert_eq!(par.dataset.len(), 40 * 24);
        // Document order (latest day first) is preserved.
        assert_eq!(par.dataset.rows()[0].timestamp, start + TimeDelta::days(39));
    }

    #[test]
    fn empty_document_is_an_empty_dataset() {
        let out = reconstruct(&XmlNode::element("GL_MarketDocument"), &ReconstructOptions::default());
        assert!(out.dataset.is_empty());
        assert!(out.diagnostics.segments.is_empty());
    }

    #[test]
    fn segment_ending_at_the_last_representable_instant_stays_aligned() {
        let end = chrono::DateTime::<Utc>::MAX_UTC;
        let start = end - TimeDelta::hours(1);
        let segment = Segment {
            start,
            end,
            samples: vec![Some(1.0); 4],
            declared_resolution: None,
        };

        let prepared = synthesize_segment(0, segment);
        assert_eq!(prepared.timestamps.len(), 4);
        assert!(prepared.timestamps.iter().all(|t| *t < end));

        let out = concatenate(vec![Ok(prepared)]);
        assert_eq!(out.dataset.len(), 4);
        assert!(out.is_complete());
    }

    #[test]
    fn hand_built_segment_without_a_span_is_misaligned_not_truncated() {
        let at = Utc.with_ymd_and_hms(2015, 1, 1, 1, 0, 0).unwrap();
        let inverted = Segment {
            start: at,
            end: at - TimeDelta::hours(1),
            samples: vec![Some(1.0), Some(2.0)],
            declared_resolution: None,
        };
        let good = Segment {
            start: at,
            end: at + TimeDelta::hours(1),
            samples: vec![Some(3.0)],
            declared_resolution: None,
        };

        let out = concatenate(vec![
            Ok(synthesize_segment(0, inverted)),
            Ok(synthesize_segment(1, good)),
        ]);
        assert_eq!(out.dataset.len(), 1);
        assert_eq!(out.diagnostics.segments[0].status, SegmentStatus::Misaligned);
        assert_eq!(
            out.diagnostics.errors,
            vec![SegmentError::Misalignment(MisalignmentError {
                index: 0,
                timestamps: 0,
                samples: 2,
            })]
        );
    }
}
