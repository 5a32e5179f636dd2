//! The owning controller — one configuration value in, every derived
//! artifact out.
//!
//! DERIVATION ORDER (fixed, never reordered):
//!   1. layout     (windows + jitter radius)
//!   2. samples    (day-major expansion)
//!   3. conflicts  (static coverage check)
//!   4. artifact   (calculation-field chain)
//!
//! RULES:
//!   - The configuration is immutable. Commands build a replacement
//!     value and the engine re-derives everything in full; there are
//!     no partial updates and no hidden recomputation order.
//!   - The Monte-Carlo diagnostic is on-demand, read-only, and never
//!     feeds back into derivation.

use chrono::NaiveDateTime;

use crate::command::ConfigCommand;
use crate::config::{LayoutMode, ScheduleConfig};
use crate::diagnostics::{check_conflicts, run_monte_carlo, Conflict, SimulationReport};
use crate::emitter::{emit, ScheduleArtifact};
use crate::error::ScheduleResult;
use crate::layout::{build_layout, LayoutWarning, WindowLayout};
use crate::preview::{preview_schedule, PreviewEntry};
use crate::schedule::{expand, SampleInstance};

pub struct ScheduleEngine {
    config: ScheduleConfig,
    layout: WindowLayout,
    samples: Vec<SampleInstance>,
    conflicts: Vec<Conflict>,
    artifact: ScheduleArtifact,
    warnings: Vec<LayoutWarning>,
}

impl ScheduleEngine {
    pub fn new(config: ScheduleConfig) -> ScheduleResult<Self> {
        config.validate()?;
        let mut engine = Self {
            config,
            layout: WindowLayout::default(),
            samples: vec![],
            conflicts: vec![],
            artifact: ScheduleArtifact::default(),
            warnings: vec![],
        };
        engine.rederive();
        Ok(engine)
    }

    /// Apply one edit and re-derive. On validation failure the
    /// previous configuration stays in force.
    pub fn apply(&mut self, command: ConfigCommand) -> ScheduleResult<()> {
        let mut next = self.config.clone();
        match command {
            ConfigCommand::SetNumDays { num_days } => next.num_days = num_days,
            ConfigCommand::UseDerivedLayout {
                day_start,
                day_end,
                samples_per_day,
                min_gap,
            } => {
                next.layout = LayoutMode::Derived {
                    day_start,
                    day_end,
                    samples_per_day,
                    min_gap,
                };
            }
            ConfigCommand::UseExplicitWindows { windows, jitter } => {
                next.layout = LayoutMode::Explicit { windows, jitter };
            }
            ConfigCommand::AddWindow { window } => match &mut next.layout {
                LayoutMode::Explicit { windows, .. } => windows.push(window),
                LayoutMode::Derived { .. } => {
                    log::warn!("add_window ignored: layout is in derived mode");
                    return Ok(());
                }
            },
            ConfigCommand::RemoveWindow { index } => match &mut next.layout {
                LayoutMode::Explicit { windows, .. } if index < windows.len() => {
                    windows.remove(index);
                }
                LayoutMode::Explicit { .. } => {
                    log::warn!("remove_window ignored: index {index} out of range");
                    return Ok(());
                }
                LayoutMode::Derived { .. } => {
                    log::warn!("remove_window ignored: layout is in derived mode");
                    return Ok(());
                }
            },
            ConfigCommand::SetJitter { jitter } => match &mut next.layout {
                LayoutMode::Explicit { jitter: j, .. } => *j = jitter,
                LayoutMode::Derived { .. } => {
                    log::warn!("set_jitter ignored: derived mode computes its own radius");
                    return Ok(());
                }
            },
            ConfigCommand::SetNaming { naming } => next.naming = naming,
            ConfigCommand::SetAsi { asi } => next.asi = asi,
        }
        next.validate()?;
        self.config = next;
        self.rederive();
        Ok(())
    }

    fn rederive(&mut self) {
        let (layout, warnings) = build_layout(&self.config.layout);
        self.samples = expand(&layout, self.config.num_days);
        self.conflicts = check_conflicts(&layout);
        self.artifact = emit(&self.config, &layout, &self.samples);
        self.layout = layout;
        self.warnings = warnings;

        log::debug!(
            "rederived: {} windows, {} samples, {} steps, {} conflicts",
            self.layout.windows.len(),
            self.samples.len(),
            self.artifact.steps.len(),
            self.conflicts.len()
        );
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    pub fn layout(&self) -> &WindowLayout {
        &self.layout
    }

    pub fn samples(&self) -> &[SampleInstance] {
        &self.samples
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    pub fn artifact(&self) -> &ScheduleArtifact {
        &self.artifact
    }

    pub fn warnings(&self) -> &[LayoutWarning] {
        &self.warnings
    }

    /// False while the configuration resolves to zero windows or zero
    /// samples ("nothing to show yet").
    pub fn is_configured(&self) -> bool {
        !self.artifact.is_empty()
    }

    /// Run the Monte-Carlo coverage diagnostic against the current
    /// derivation.
    pub fn run_diagnostics(&self, trials: usize, master_seed: u64) -> SimulationReport {
        run_monte_carlo(
            &self.layout,
            self.config.num_days,
            &self.samples,
            trials,
            master_seed,
        )
    }

    /// Resolve concrete delivery instants for one participant seed.
    pub fn preview(&self, raw_seed: u64, start: NaiveDateTime) -> Vec<PreviewEntry> {
        preview_schedule(
            raw_seed,
            start,
            self.layout.jitter,
            self.config.num_days,
            &self.samples,
        )
    }
}
