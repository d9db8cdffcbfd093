//! Cross-references the intervals enabled in the configuration against the
//! intervals enabled in the schedule.
//!
//! Pure detective control: the two backing files are written independently,
//! so they can drift apart; this reports the drift, it never repairs it.

use serde::Serialize;
use std::collections::HashSet;

#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct ConsistencyReport {
    /// Scheduled but without an enabled retention entry.
    pub missing_in_config: Vec<String>,
    /// Retained in the configuration but missing or disabled in the
    /// schedule.
    pub missing_in_schedule: Vec<String>,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.missing_in_config.is_empty() && self.missing_in_schedule.is_empty()
    }
}

/// Symmetric difference of the two active-interval sequences, each
/// direction reported in the input's scan order.
pub fn check(config_active: &[String], schedule_active: &[String]) -> ConsistencyReport {
    let config_set: HashSet<&str> = config_active.iter().map(String::as_str).collect();
    let schedule_set: HashSet<&str> = schedule_active.iter().map(String::as_str).collect();

    ConsistencyReport {
        missing_in_config: schedule_active
            .iter()
            .filter(|name| !config_set.contains(name.as_str()))
            .cloned()
            .collect(),
        missing_in_schedule: config_active
            .iter()
            .filter(|name| !schedule_set.contains(name.as_str()))
            .cloned()
            .collect(),
    }
}
