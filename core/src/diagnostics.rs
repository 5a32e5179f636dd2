//! Coverage diagnostics — static conflict detection plus the
//! Monte-Carlo histogram.
//!
//! RULE: Everything here is advisory output for the user. Nothing in
//! this module may feed back into layout, expansion, or emission.

use serde::Serialize;

use crate::layout::WindowLayout;
use crate::rng::TrialSeeds;
use crate::schedule::{resolve_samples, SampleInstance};
use crate::types::{Day, Minutes};

/// Trials per Monte-Carlo run.
pub const DEFAULT_TRIALS: usize = 10_000;

/// Histogram bucket width.
pub const BUCKET_MINUTES: Minutes = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// Adjacent jittered extents intersect: a time two windows can claim.
    Overlap,
    /// Gap between adjacent jittered extents: a time no window can reach.
    DeadZone,
}

/// A region between two adjacent (by start offset) windows' jittered
/// extents. Indices refer to the layout's window order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub start: Minutes,
    pub end: Minutes,
    pub earlier: usize,
    pub later: usize,
}

/// Compare each adjacent pair of windows (sorted by start) under the
/// layout's jitter radius. Exactly-touching extents are neither an
/// overlap nor a dead zone.
pub fn check_conflicts(layout: &WindowLayout) -> Vec<Conflict> {
    let jitter = layout.jitter;
    let mut order: Vec<usize> = (0..layout.windows.len()).collect();
    order.sort_by_key(|&i| layout.windows[i].start);

    let mut conflicts = Vec::new();
    for pair in order.windows(2) {
        let (earlier, later) = (pair[0], pair[1]);
        let prev = &layout.windows[earlier];
        let next = &layout.windows[later];
        let prev_extent_end = prev.end() + jitter;
        let next_extent_start = next.start - jitter;

        if prev_extent_end > next_extent_start {
            conflicts.push(Conflict {
                kind: ConflictKind::Overlap,
                start: next_extent_start,
                end: prev_extent_end,
                earlier,
                later,
            });
        } else if prev_extent_end < next_extent_start {
            conflicts.push(Conflict {
                kind: ConflictKind::DeadZone,
                start: prev_extent_end,
                end: next_extent_start,
                earlier,
                later,
            });
        }
    }
    conflicts
}

/// Per-window counts of sampled times in fixed-width buckets, over an
/// hour-aligned display range.
#[derive(Debug, Clone, Serialize)]
pub struct Histogram {
    /// Inclusive, hour-aligned display start.
    pub origin: Minutes,
    /// Exclusive, hour-aligned display end.
    pub end: Minutes,
    pub bucket_minutes: Minutes,
    /// `counts[bucket][window]`, supporting a stacked-by-window view.
    pub counts: Vec<Vec<u64>>,
}

impl Histogram {
    fn new(origin: Minutes, end: Minutes, window_count: usize) -> Self {
        let buckets = ((end - origin).max(0) / BUCKET_MINUTES) as usize;
        Self {
            origin,
            end,
            bucket_minutes: BUCKET_MINUTES,
            counts: vec![vec![0; window_count]; buckets],
        }
    }

    fn record(&mut self, time: Minutes, window: usize) {
        if self.counts.is_empty() {
            return;
        }
        let bucket = ((time - self.origin).div_euclid(self.bucket_minutes))
            .clamp(0, self.counts.len() as Minutes - 1) as usize;
        self.counts[bucket][window] += 1;
    }

    /// Total hits in one bucket across all windows.
    pub fn bucket_total(&self, bucket: usize) -> u64 {
        self.counts[bucket].iter().sum()
    }

    /// Total hits attributed to one window.
    pub fn window_total(&self, window: usize) -> u64 {
        self.counts.iter().map(|b| b[window]).sum()
    }
}

/// The outcome of one Monte-Carlo run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub trials: usize,
    pub total_draws: u64,
    pub histogram: Histogram,
}

/// Hour-aligned display range: one hour of margin beyond the jittered
/// extremes on both sides.
pub fn display_range(layout: &WindowLayout) -> (Minutes, Minutes) {
    let earliest = layout.windows.iter().map(|w| w.start).min().unwrap_or(0);
    let latest = layout.windows.iter().map(|w| w.end()).max().unwrap_or(0);
    let lo = (earliest - layout.jitter - 60).div_euclid(60) * 60;
    let hi = (latest + layout.jitter + 60 + 59).div_euclid(60) * 60;
    (lo, hi)
}

/// Run `trials` independent trials, each with its own uniformly random
/// 32-bit seed, walking the canonical draw chain and binning every
/// resolved sample time per window.
pub fn run_monte_carlo(
    layout: &WindowLayout,
    num_days: Day,
    samples: &[SampleInstance],
    trials: usize,
    master_seed: u64,
) -> SimulationReport {
    if layout.is_empty() || samples.is_empty() {
        return SimulationReport {
            trials: 0,
            total_draws: 0,
            histogram: Histogram::new(0, 0, 0),
        };
    }

    let (lo, hi) = display_range(layout);
    let mut histogram = Histogram::new(lo, hi, layout.windows.len());
    let mut seeds = TrialSeeds::new(master_seed);
    let mut total_draws = 0u64;

    for _ in 0..trials {
        let raw_seed = seeds.next_seed();
        for resolved in resolve_samples(raw_seed, layout.jitter, num_days, samples) {
            histogram.record(resolved.time, resolved.window);
            total_draws += 1;
        }
    }

    log::debug!(
        "monte carlo: {trials} trials, {total_draws} draws over {} windows",
        layout.windows.len()
    );

    SimulationReport { trials, total_draws, histogram }
}
