//! Project configuration — the single input record every derivation
//! consumes.
//!
//! RULE: Configuration is immutable once handed to the engine. Edits
//! go through `ConfigCommand` and replace the whole value; no code
//! path mutates a field in place.

use serde::{Deserialize, Serialize};

use crate::error::{ScheduleError, ScheduleResult};
use crate::types::{Day, Minutes};

/// One explicit daily sampling window as entered by the user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WindowSpec {
    pub start_hour: u32,
    pub start_min: u32,
    pub duration: Minutes,
}

impl WindowSpec {
    pub fn new(start_hour: u32, start_min: u32, duration: Minutes) -> Self {
        Self { start_hour, start_min, duration }
    }

    pub fn start_minutes(&self) -> Minutes {
        (self.start_hour * 60 + self.start_min) as Minutes
    }
}

/// How the daily windows are produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LayoutMode {
    /// Windows entered directly ("advanced" editing). Only window
    /// duration is validated; overlaps are flagged by diagnostics,
    /// never rejected here.
    Explicit {
        windows: Vec<WindowSpec>,
        #[serde(default)]
        jitter: Minutes,
    },
    /// Windows computed from outer bounds, count, and minimum gap.
    /// The jitter radius falls out of the gap (`min_gap / 2`).
    Derived {
        day_start: Minutes,
        day_end: Minutes,
        samples_per_day: u32,
        min_gap: Minutes,
    },
}

/// Field, form, and event identifiers used in the emitted artifact.
/// Every identifier must be engine-safe: a lowercase letter followed
/// by lowercase letters, digits, or underscores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NamingConfig {
    pub config_form: String,
    pub survey_form: String,
    pub start_field: String,
    pub seed_field: String,
    pub rand_prefix: String,
    pub jitter_prefix: String,
    pub deliver_at_prefix: String,
    pub event_prefix: String,
    pub enrollment_event: String,
    pub field_name_a: String,
    pub field_name_c: String,
    pub field_name_m: String,
    pub arm_num: u32,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            config_form:       "ema_setup".into(),
            survey_form:       "ema".into(),
            start_field:       "ema_start_at".into(),
            seed_field:        "seed_input".into(),
            rand_prefix:       "rand".into(),
            jitter_prefix:     "jitter".into(),
            deliver_at_prefix: "ema_deliver_at".into(),
            event_prefix:      "ema".into(),
            enrollment_event:  "enrollment".into(),
            field_name_a:      "a".into(),
            field_name_c:      "c".into(),
            field_name_m:      "m".into(),
            arm_num:           1,
        }
    }
}

impl NamingConfig {
    /// Enrollment event name with the arm suffix, e.g. `enrollment_arm_1`.
    pub fn enrollment_event_unique(&self) -> String {
        format!("{}_arm_{}", self.enrollment_event, self.arm_num)
    }

    fn identifiers(&self) -> [(&'static str, &str); 12] {
        [
            ("config form", &self.config_form),
            ("survey form", &self.survey_form),
            ("start field", &self.start_field),
            ("seed field", &self.seed_field),
            ("rand prefix", &self.rand_prefix),
            ("jitter prefix", &self.jitter_prefix),
            ("deliver-at prefix", &self.deliver_at_prefix),
            ("event prefix", &self.event_prefix),
            ("enrollment event", &self.enrollment_event),
            ("constant a field", &self.field_name_a),
            ("constant c field", &self.field_name_c),
            ("constant m field", &self.field_name_m),
        ]
    }

    pub fn validate(&self) -> ScheduleResult<()> {
        for (what, value) in self.identifiers() {
            if !is_engine_safe(value) {
                return Err(ScheduleError::InvalidIdentifier {
                    what,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Automated survey invitation (ASI) text parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AsiConfig {
    pub sender: String,
    pub logic: String,
    pub subject: String,
    pub body: String,
}

impl Default for AsiConfig {
    fn default() -> Self {
        Self {
            sender:  "noreply@example.edu".into(),
            logic:   "[email] <> \"\"".into(),
            subject: "EMA Survey: [event-name]".into(),
            body:    "<p>Please complete your EMA survey:</p>\n<p>[survey-link]</p>".into(),
        }
    }
}

/// The complete project configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleConfig {
    pub num_days: Day,
    pub layout: LayoutMode,
    #[serde(default)]
    pub naming: NamingConfig,
    #[serde(default)]
    pub asi: AsiConfig,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        // Two 90-minute morning/afternoon windows, one week of sampling.
        Self {
            num_days: 7,
            layout: LayoutMode::Explicit {
                windows: vec![WindowSpec::new(9, 15, 90), WindowSpec::new(13, 15, 90)],
                jitter: 0,
            },
            naming: NamingConfig::default(),
            asi: AsiConfig::default(),
        }
    }
}

impl ScheduleConfig {
    /// Load a project configuration from a JSON file.
    pub fn load(path: &str) -> ScheduleResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ScheduleResult<()> {
        self.naming.validate()
    }

    /// Derived-mode config used throughout the unit tests: the worked
    /// default of four 150-minute windows between 9:00 and 21:00.
    pub fn default_test() -> Self {
        Self {
            num_days: 7,
            layout: LayoutMode::Derived {
                day_start: 540,
                day_end: 1260,
                samples_per_day: 4,
                min_gap: 30,
            },
            naming: NamingConfig::default(),
            asi: AsiConfig::default(),
        }
    }
}

fn is_engine_safe(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_naming_is_valid() {
        ScheduleConfig::default().validate().unwrap();
        ScheduleConfig::default_test().validate().unwrap();
    }

    #[test]
    fn rejects_unsafe_identifiers() {
        let mut config = ScheduleConfig::default();
        config.naming.rand_prefix = "Rand Prefix".into();
        assert!(matches!(
            config.validate(),
            Err(ScheduleError::InvalidIdentifier { .. })
        ));

        config.naming.rand_prefix = "".into();
        assert!(config.validate().is_err());

        config.naming.rand_prefix = "9rand".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = ScheduleConfig::default_test();
        let json = serde_json::to_string(&config).unwrap();
        let back: ScheduleConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
