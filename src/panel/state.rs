//! The editable surface as one explicit state container.
//!
//! Everything the operator can touch lives here: the two raw-text buffers,
//! their parsed models, and the transient notice list. Mutation happens
//! only through the named transitions below; derived values (consistency,
//! next-run previews) are computed on demand from the current state.

use crate::panel::config::SnapshotConfig;
use crate::panel::consistency::{self, ConsistencyReport};
use crate::panel::result_error::error::Error;
use crate::panel::result_error::result::Result;
use crate::panel::schedule::{ScheduleEntry, ScheduleFile};
use crate::panel::timing::{self, NextRun};
use chrono::{DateTime, Duration, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Display, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[display("success")]
    Success,
    #[display("danger")]
    Danger,
}

/// One transient operator-facing notice.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Notice {
    pub severity: Severity,
    pub title: String,
    pub created: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PanelState {
    pub config_text: String,
    pub schedule_text: String,
    pub config: SnapshotConfig,
    pub schedule: ScheduleFile,
    pub notices: Vec<Notice>,
}

impl PanelState {
    pub fn new<S: Into<String>>(tool: S) -> Self {
        Self {
            config_text: String::new(),
            schedule_text: String::new(),
            config: SnapshotConfig::default(),
            schedule: ScheduleFile::with_defaults(tool),
            notices: Vec::new(),
        }
    }

    /// Replaces the configuration buffer and reparses. The previous model
    /// is discarded, never merged, so any pending edit is lost.
    pub fn load_config_text(&mut self, text: String) {
        self.config = SnapshotConfig::parse(&text);
        self.config_text = text;
    }

    /// Same replace-don't-merge semantics for the schedule buffer.
    pub fn load_schedule_text(&mut self, text: String) {
        self.schedule = ScheduleFile::parse(&text, &self.schedule.tool.clone());
        self.schedule_text = text;
    }

    /// Re-renders the configuration buffer from the structured model,
    /// returning the text to be written back.
    pub fn render_config(&mut self) -> &str {
        self.config_text = self.config.serialize();
        &self.config_text
    }

    pub fn render_schedule(&mut self) -> &str {
        self.schedule_text = self.schedule.serialize();
        &self.schedule_text
    }

    pub fn push_notice<S: Into<String>>(&mut self, severity: Severity, title: S, now: DateTime<Utc>) {
        self.notices.push(Notice {
            severity,
            title: title.into(),
            created: now,
        });
    }

    /// Drops notices older than `ttl` as of `now`.
    pub fn prune_notices(&mut self, now: DateTime<Utc>, ttl: std::time::Duration) {
        let ttl = Duration::from_std(ttl).unwrap_or(Duration::zero());
        self.notices.retain(|n| n.created + ttl > now);
    }

    /// Sets an interval's timing expression, creating a disabled entry if
    /// the interval is not managed yet. Rejects lexically invalid
    /// expressions at the mutation boundary.
    pub fn set_schedule_timing(&mut self, name: &str, timing_expr: &str) -> Result<()> {
        if !timing::is_valid_expression(timing_expr) {
            return Err(Error::invalid_timing(timing_expr));
        }
        if !self.schedule.set_timing(name, timing_expr) {
            self.schedule
                .upsert_entry(ScheduleEntry::new(name, timing_expr, false));
        }
        Ok(())
    }

    /// Current drift between the two backing files.
    pub fn consistency(&self) -> ConsistencyReport {
        consistency::check(
            &self.config.active_intervals(),
            &self.schedule.active_intervals(),
        )
    }

    /// Next-run preview per enabled schedule entry.
    pub fn next_runs(&self, now: &DateTime<Utc>) -> Vec<(String, NextRun)> {
        self.schedule
            .entries
            .iter()
            .filter(|e| e.enabled)
            .map(|e| (e.name.clone(), timing::next_run(&e.timing, now)))
            .collect()
    }
}
