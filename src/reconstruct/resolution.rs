//! Per-segment sampling interval.
//!
//! The provider sends equally spaced, half-open series: the declared `end` sits one
//! interval past the last sample. The interval is therefore `(end - start) / n`, and
//! never `(end - start) / (n - 1)`.

use std::fmt;

use chrono::TimeDelta;

use super::error::{ResolutionConcern, SuspiciousResolutionWarning};
use crate::domain::{Instant, Segment};

const NANOS_PER_SECOND: i64 = 1_000_000_000;
const NANOS_PER_MINUTE: i64 = 60 * NANOS_PER_SECOND;

/// Fixed spacing between consecutive samples of one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Resolution(TimeDelta);

impl Resolution {
    pub fn from_step(step: TimeDelta) -> Self {
        Self(step)
    }

    pub fn step(self) -> TimeDelta {
        self.0
    }

    fn nanos(self) -> i64 {
        // A year is ~3.2e16 ns; anything the provider sends fits.
        self.0.num_nanoseconds().unwrap_or(i64::MAX)
    }

    pub fn is_whole_minutes(self) -> bool {
        let ns = self.nanos();
        ns > 0 && ns % NANOS_PER_MINUTE == 0
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = self.nanos();
        if ns > 0 && ns % NANOS_PER_MINUTE == 0 {
            write!(f, "{}min", ns / NANOS_PER_MINUTE)
        } else if ns % NANOS_PER_SECOND == 0 {
            write!(f, "{}s", ns / NANOS_PER_SECOND)
        } else {
            write!(f, "{ns}ns")
        }
    }
}

/// Interval for a `[start, end)` span holding `sample_count` samples.
///
/// `None` when there are no samples (nothing to space) or the span is not positive.
pub fn infer_interval(start: Instant, end: Instant, sample_count: usize) -> Option<Resolution> {
    if sample_count == 0 {
        return None;
    }
    let span_ns = (end - start).num_nanoseconds()?;
    if span_ns <= 0 {
        return None;
    }
    let n = i64::try_from(sample_count).ok()?;
    Some(Resolution(TimeDelta::nanoseconds(span_ns / n)))
}

pub fn infer_resolution(segment: &Segment) -> Option<Resolution> {
    infer_interval(segment.start, segment.end, segment.sample_count())
}

/// Sanity checks on an inferred resolution. The inferred value is trusted either way.
pub fn review_resolution(
    index: usize,
    segment: &Segment,
    resolution: Resolution,
) -> Vec<SuspiciousResolutionWarning> {
    let mut concerns = Vec::new();

    if !resolution.is_whole_minutes() {
        concerns.push(ResolutionConcern::NotWholeMinute);
    }

    if let Some(declared) = &segment.declared_resolution {
        match parse_iso_duration(declared) {
            Some(step) if step == resolution.step() => {}
            Some(_) => concerns.push(ResolutionConcern::DeclaredMismatch {
                declared: declared.clone(),
            }),
            None => concerns.push(ResolutionConcern::UnreadableDeclared {
                declared: declared.clone(),
            }),
        }
    }

    concerns
        .into_iter()
        .map(|concern| SuspiciousResolutionWarning {
            index,
            resolution,
            concern,
        })
        .collect()
}

/// Parse the fixed-length subset of ISO-8601 durations (`PT15M`, `PT1H`, `P1D`, `P1W`).
///
/// Calendar units (`Y`, date-part `M`) have no fixed length and are rejected.
pub fn parse_iso_duration(text: &str) -> Option<TimeDelta> {
    let rest = text.trim().strip_prefix('P')?;
    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (rest, None),
    };

    let mut seen_unit = false;
    let mut seconds = sum_units(date_part, &[('W', 7 * 86_400), ('D', 86_400)], &mut seen_unit)?;
    if let Some(time) = time_part {
        if time.is_empty() {
            return None;
        }
        let time_seconds = sum_units(time, &[('H', 3_600), ('M', 60), ('S', 1)], &mut seen_unit)?;
        seconds = seconds.checked_add(time_seconds)?;
    }

    if !seen_unit || seconds <= 0 {
        return None;
    }
    TimeDelta::try_seconds(seconds)
}

/// Sum `<digits><unit>` groups; units must appear in the given order, at most once each.
fn sum_units(part: &str, units: &[(char, i64)], seen_unit: &mut bool) -> Option<i64> {
    let mut total: i64 = 0;
    let mut digits = String::new();
    let mut next_unit = 0;

    for ch in part.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }
        let offset = units[next_unit..].iter().position(|(unit, _)| *unit == ch)?;
        let (_, scale) = units[next_unit + offset];
        let count: i64 = digits.parse().ok()?;
        digits.clear();
        total = total.checked_add(count.checked_mul(scale)?)?;
        next_unit += offset + 1;
        *seen_unit = true;
    }

    if !digits.is_empty() {
        return None;
    }
    Some(total)
}
