//! ema-core — deterministic, reproducible sampling schedules for
//! ecological-momentary-assessment studies.
//!
//! A small set of user parameters becomes a conflict-free set of daily
//! sampling windows with jitter; the schedule is emitted both as a
//! chain of calculation-field expressions a host data-capture platform
//! evaluates per record, and as Monte-Carlo coverage diagnostics for
//! visual verification. Every derivation is a pure function of one
//! configuration value — same input, byte-identical output.

pub mod command;
pub mod config;
pub mod diagnostics;
pub mod emitter;
pub mod engine;
pub mod error;
pub mod export;
pub mod import;
pub mod layout;
pub mod preview;
pub mod rng;
pub mod schedule;
pub mod snapshot;
pub mod types;
