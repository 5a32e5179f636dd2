//! Window layout — the ordered set of daily sampling windows plus the
//! global jitter radius.
//!
//! Two variants produce the same shape: explicit windows pass through
//! with duration validation only, derived windows are computed from
//! outer bounds, count, and minimum gap. A degenerate configuration
//! resolves to an empty layout with warnings — never an error.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{LayoutMode, WindowSpec};
use crate::types::Minutes;

/// A daily sampling window. Invariant: `duration > 0` for every
/// window that makes it into a layout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Window {
    pub start: Minutes,
    pub duration: Minutes,
}

impl Window {
    pub fn new(start: Minutes, duration: Minutes) -> Self {
        Self { start, duration }
    }

    /// Exclusive end offset.
    pub fn end(&self) -> Minutes {
        self.start + self.duration
    }
}

/// The windows for one study day plus the jitter radius applied to
/// every window's draw that day. An empty `windows` vec is the
/// explicit "not configured" state downstream must tolerate.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WindowLayout {
    pub windows: Vec<Window>,
    pub jitter: Minutes,
}

impl WindowLayout {
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

/// Non-fatal layout conditions surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutWarning {
    /// Explicit window dropped: its duration was not positive.
    NonPositiveDuration { index: usize, duration: Minutes },
    /// Derived span collapsed after insetting by the jitter radius.
    DegenerateSpan { total_span: Minutes },
    /// Derived per-window duration came out non-positive.
    DegenerateDuration { window_duration: Minutes },
    /// Derived sample count below one.
    NoSamplesRequested,
}

impl fmt::Display for LayoutWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveDuration { index, duration } => write!(
                f,
                "window {} dropped: duration {duration} is not positive",
                index + 1
            ),
            Self::DegenerateSpan { total_span } => write!(
                f,
                "no usable span between the day bounds (inner span {total_span} min)"
            ),
            Self::DegenerateDuration { window_duration } => write!(
                f,
                "requested samples and gap leave no room for windows \
                 (computed duration {window_duration} min)"
            ),
            Self::NoSamplesRequested => write!(f, "samples per day must be at least 1"),
        }
    }
}

/// Build the layout for a configured mode.
pub fn build_layout(mode: &LayoutMode) -> (WindowLayout, Vec<LayoutWarning>) {
    match mode {
        LayoutMode::Explicit { windows, jitter } => explicit_layout(windows, *jitter),
        LayoutMode::Derived { day_start, day_end, samples_per_day, min_gap } => {
            derived_layout(*day_start, *day_end, *samples_per_day, *min_gap)
        }
    }
}

/// Explicit variant: validate durations, keep entry order. Overlaps
/// are diagnosed later, not rejected here.
pub fn explicit_layout(
    specs: &[WindowSpec],
    jitter: Minutes,
) -> (WindowLayout, Vec<LayoutWarning>) {
    let mut windows = Vec::with_capacity(specs.len());
    let mut warnings = Vec::new();
    for (index, spec) in specs.iter().enumerate() {
        if spec.duration <= 0 {
            warnings.push(LayoutWarning::NonPositiveDuration {
                index,
                duration: spec.duration,
            });
            continue;
        }
        windows.push(Window::new(spec.start_minutes(), spec.duration));
    }
    (WindowLayout { windows, jitter: jitter.max(0) }, warnings)
}

/// Derived variant: equal windows separated by exactly `min_gap`,
/// inset by the jitter radius so jittered extents never cross the
/// outer bounds.
pub fn derived_layout(
    day_start: Minutes,
    day_end: Minutes,
    samples_per_day: u32,
    min_gap: Minutes,
) -> (WindowLayout, Vec<LayoutWarning>) {
    let min_gap = min_gap.max(0);
    let jitter = min_gap / 2;
    let empty = |warning| (WindowLayout { windows: vec![], jitter }, vec![warning]);

    if samples_per_day < 1 {
        return empty(LayoutWarning::NoSamplesRequested);
    }

    let inner_start = day_start + jitter;
    let inner_end = day_end - jitter;
    let total_span = inner_end - inner_start;
    if total_span <= 0 {
        return empty(LayoutWarning::DegenerateSpan { total_span });
    }

    let count = samples_per_day as Minutes;
    let window_duration = (total_span - (count - 1) * min_gap) / count;
    if window_duration <= 0 {
        return empty(LayoutWarning::DegenerateDuration { window_duration });
    }

    let windows = (0..count)
        .map(|i| Window::new(inner_start + i * (window_duration + min_gap), window_duration))
        .collect();

    log::debug!(
        "derived layout: {samples_per_day} windows x {window_duration} min, \
         jitter {jitter}, inner span {inner_start}..{inner_end}"
    );

    (WindowLayout { windows, jitter }, vec![])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_matches_worked_default() {
        // 9:00-21:00, 4 samples, 30 min gap.
        let (layout, warnings) = derived_layout(540, 1260, 4, 30);
        assert!(warnings.is_empty());
        assert_eq!(layout.jitter, 15);
        let starts: Vec<Minutes> = layout.windows.iter().map(|w| w.start).collect();
        assert_eq!(starts, vec![555, 735, 915, 1095]);
        assert!(layout.windows.iter().all(|w| w.duration == 150));
    }

    #[test]
    fn derived_windows_keep_exact_gap() {
        let (layout, _) = derived_layout(540, 1260, 4, 30);
        for pair in layout.windows.windows(2) {
            assert_eq!(pair[1].start - pair[0].end(), 30);
        }
    }

    #[test]
    fn collapsed_span_yields_empty_layout() {
        let (layout, warnings) = derived_layout(600, 600, 3, 30);
        assert!(layout.is_empty());
        assert_eq!(layout.jitter, 15); // radius still reported
        assert!(matches!(warnings[0], LayoutWarning::DegenerateSpan { .. }));
    }

    #[test]
    fn oversized_gap_yields_empty_layout() {
        // 60 min of span, 5 samples, 30 min gaps: nothing fits.
        let (layout, warnings) = derived_layout(540, 600, 5, 30);
        assert!(layout.is_empty());
        assert!(matches!(warnings[0], LayoutWarning::DegenerateDuration { .. }));
    }

    #[test]
    fn zero_samples_yields_empty_layout() {
        let (layout, warnings) = derived_layout(540, 1260, 0, 30);
        assert!(layout.is_empty());
        assert_eq!(warnings, vec![LayoutWarning::NoSamplesRequested]);
    }

    #[test]
    fn explicit_drops_only_invalid_windows() {
        let specs = [
            WindowSpec::new(9, 15, 90),
            WindowSpec::new(12, 0, 0),
            WindowSpec::new(13, 15, 90),
        ];
        let (layout, warnings) = explicit_layout(&specs, 10);
        assert_eq!(layout.windows.len(), 2);
        assert_eq!(layout.windows[0].start, 555);
        assert_eq!(layout.windows[1].start, 795);
        assert_eq!(
            warnings,
            vec![LayoutWarning::NonPositiveDuration { index: 1, duration: 0 }]
        );
    }

    #[test]
    fn explicit_keeps_overlapping_windows() {
        // Overlap is a diagnostics concern, not a layout rejection.
        let specs = [WindowSpec::new(9, 0, 120), WindowSpec::new(10, 0, 120)];
        let (layout, warnings) = explicit_layout(&specs, 0);
        assert_eq!(layout.windows.len(), 2);
        assert!(warnings.is_empty());
    }
}
