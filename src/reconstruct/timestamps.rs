//! Timestamp synthesis for one segment.

use super::resolution::Resolution;
use crate::domain::Instant;

/// `start, start + step, ..., start + (count - 1) * step`.
///
/// Exactly `count` instants unless the sequence would leave chrono's representable
/// range, in which case it stops short and the aligner reports the mismatch.
pub fn synthesize_timestamps(start: Instant, resolution: Resolution, count: usize) -> Vec<Instant> {
    let step = resolution.step();
    std::iter::successors(Some(start), |t| t.checked_add_signed(step))
        .take(count)
        .collect()
}
