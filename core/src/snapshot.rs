//! Project snapshot — the configuration to/from JSON.
//!
//! Only the configuration is persisted. The derived artifact is a
//! pure function of it and is rebuilt on load, so a snapshot can
//! never disagree with its derivation.

use serde::{Deserialize, Serialize};

use crate::config::ScheduleConfig;
use crate::error::ScheduleResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub saved_at: String,
    pub config: ScheduleConfig,
}

impl ProjectSnapshot {
    pub fn capture(config: &ScheduleConfig) -> Self {
        Self {
            saved_at: chrono::Utc::now().to_rfc3339(),
            config: config.clone(),
        }
    }

    pub fn write(&self, path: &str) -> ScheduleResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn read(path: &str) -> ScheduleResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let snapshot: Self = serde_json::from_str(&content)?;
        snapshot.config.validate()?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_round_trips_the_config() {
        let config = ScheduleConfig::default_test();
        let snapshot = ProjectSnapshot::capture(&config);
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: ProjectSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.config, config);
    }
}
