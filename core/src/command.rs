use serde::{Deserialize, Serialize};

use crate::config::{AsiConfig, NamingConfig, WindowSpec};
use crate::types::{Day, Minutes};

/// All configuration edits. Each produces a whole new configuration
/// value; the engine re-derives the full artifact afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum ConfigCommand {
    SetNumDays {
        num_days: Day,
    },
    /// Switch to (or re-parameterize) the derived layout.
    UseDerivedLayout {
        day_start: Minutes,
        day_end: Minutes,
        samples_per_day: u32,
        min_gap: Minutes,
    },
    /// Switch to (or replace) explicitly entered windows.
    UseExplicitWindows {
        windows: Vec<WindowSpec>,
        jitter: Minutes,
    },
    /// Append a window (explicit mode only).
    AddWindow {
        window: WindowSpec,
    },
    /// Remove a window by position (explicit mode only).
    RemoveWindow {
        index: usize,
    },
    /// Change the jitter radius (explicit mode only; derived mode
    /// computes its own radius from the gap).
    SetJitter {
        jitter: Minutes,
    },
    SetNaming {
        naming: NamingConfig,
    },
    SetAsi {
        asi: AsiConfig,
    },
}
