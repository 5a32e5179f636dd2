//! Schedule expansion — windows x days into ordered sample instances,
//! and the shared resolution of one seed into concrete minute offsets.
//!
//! RULE: Expansion order is day-major, then window order within a day.
//! The calculation-field chain indexes fields by this exact sequence
//! position; reordering here silently corrupts every emitted schedule.

use serde::{Deserialize, Serialize};

use crate::layout::WindowLayout;
use crate::rng::{bounded, DrawChain};
use crate::types::{Day, Minutes};

/// One concrete (day, window) delivery slot. Derived data: fully
/// regenerated whenever windows, day count, or jitter change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SampleInstance {
    /// 1-based study day.
    pub day: Day,
    /// 0-based window index within the day.
    pub window: usize,
    /// Window start offset in minutes from local midnight.
    pub start: Minutes,
    /// Window duration in minutes.
    pub duration: Minutes,
}

impl SampleInstance {
    /// 1-based sample number within the day (= window position).
    pub fn sample_number(&self) -> u32 {
        self.window as u32 + 1
    }
}

/// Cross-product the layout's windows over `num_days` days.
/// Output length is always `num_days * windows.len()`.
pub fn expand(layout: &WindowLayout, num_days: Day) -> Vec<SampleInstance> {
    let mut samples = Vec::with_capacity(num_days as usize * layout.windows.len());
    for day in 1..=num_days {
        for (window, w) in layout.windows.iter().enumerate() {
            samples.push(SampleInstance {
                day,
                window,
                start: w.start,
                duration: w.duration,
            });
        }
    }
    samples
}

/// One sample's resolved minute-of-day for a single seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSample {
    pub day: Day,
    pub window: usize,
    /// Resolved time: window start + day jitter offset + in-window draw.
    pub time: Minutes,
}

/// Run the canonical draw chain once and resolve every sample.
///
/// This is the only resolution path in the crate — the Monte-Carlo
/// diagnostic and the runtime preview both call it, so the chain
/// order (seed transform, jitter block, sample block) cannot diverge
/// between consumers or from the emitted field chain.
pub fn resolve_samples(
    raw_seed: u64,
    jitter: Minutes,
    num_days: Day,
    samples: &[SampleInstance],
) -> Vec<ResolvedSample> {
    let mut chain = DrawChain::start(raw_seed);
    let offsets = chain.day_offsets(num_days, jitter);
    samples
        .iter()
        .map(|s| {
            let draw = chain.next_draw();
            let day_offset = offsets
                .get(s.day as usize - 1)
                .copied()
                .unwrap_or_default();
            ResolvedSample {
                day: s.day,
                window: s.window,
                time: s.start + day_offset + bounded(draw, s.duration),
            }
        })
        .collect()
}
