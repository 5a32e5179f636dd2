//! Runtime preview — evaluate the emitted chain in-process.
//!
//! The in-crate equivalent of what the host platform computes from the
//! emitted fields: the same draw chain, resolved against a concrete
//! seed and start instant. Agreement with the emitted expressions is
//! by construction — both sides go through `schedule::resolve_samples`
//! semantics and the shared LCG.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::schedule::{resolve_samples, SampleInstance};
use crate::types::{Day, Minutes, MINUTES_PER_DAY};

/// One concrete scheduled delivery for a participant.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PreviewEntry {
    pub day: Day,
    pub window: usize,
    /// Minutes added to the start timestamp.
    pub offset_minutes: Minutes,
    pub deliver_at: NaiveDateTime,
}

/// Resolve every sample to an absolute delivery instant:
/// `start + (day - 1) * 1440 + resolved time-of-day`, in minutes.
pub fn preview_schedule(
    raw_seed: u64,
    start: NaiveDateTime,
    jitter: Minutes,
    num_days: Day,
    samples: &[SampleInstance],
) -> Vec<PreviewEntry> {
    resolve_samples(raw_seed, jitter, num_days, samples)
        .into_iter()
        .map(|r| {
            let offset_minutes = (r.day as Minutes - 1) * MINUTES_PER_DAY + r.time;
            PreviewEntry {
                day: r.day,
                window: r.window,
                offset_minutes,
                deliver_at: start + Duration::minutes(offset_minutes),
            }
        })
        .collect()
}
