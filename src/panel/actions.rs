//! Operator-facing operations, wired through the bridge seams.
//!
//! Every operation is independently failable and leaves the panel in a
//! retryable state: a failed load substitutes a default model, a failed
//! save keeps the in-memory edit, and nothing here rolls back anything
//! else. Saving both backing files is two separate writes; the
//! consistency checker exists to notice when they drift.

use crate::panel::bridge::{FileBridge, OutputSink, ProcessBridge};
use crate::panel::notifications::Notification;
use crate::panel::result_error::result::Result;
use crate::panel::result_error::WithMsg;
use crate::panel::settings::PanelSettings;
use crate::panel::state::{PanelState, Severity};
use chrono::Utc;
use serde::Serialize;
use validator::Validate;

/// Outcome of the startup probes. A missing tool or missing privilege
/// disables the corresponding actions for the whole session.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct HostStatus {
    pub tool_available: bool,
    pub privileged: bool,
}

pub struct Panel<B> {
    settings: PanelSettings,
    bridge: B,
}

impl<B: FileBridge + ProcessBridge> Panel<B> {
    pub fn new(settings: PanelSettings, bridge: B) -> Self {
        Self { settings, bridge }
    }

    pub fn settings(&self) -> &PanelSettings {
        &self.settings
    }

    pub fn probe(&self) -> HostStatus {
        let tool_available = self.bridge.probe_binary(&self.settings.tool);
        if !tool_available {
            tracing::warn!(
                "{} is not installed; install it with your package manager to enable tool actions",
                self.settings.tool
            );
        }
        let privileged = self.bridge.probe_privilege();
        if !privileged {
            tracing::warn!("Privileged execution unavailable; saves and runs are disabled");
        }
        HostStatus {
            tool_available,
            privileged,
        }
    }

    /// Loads the configuration text into the state. A read failure
    /// substitutes the empty model and surfaces a danger notice; it is
    /// never fatal.
    pub fn load_config(&self, state: &mut PanelState) {
        match self.bridge.read_file(&self.settings.config_path) {
            Ok(text) => {
                state.load_config_text(text);
                state.push_notice(Severity::Success, "Configuration loaded", Utc::now());
            }
            Err(e) => {
                tracing::warn!("Failed to load configuration: {e}");
                state.load_config_text(String::new());
                state.push_notice(
                    Severity::Danger,
                    format!("Failed to load configuration: {e}"),
                    Utc::now(),
                );
            }
        }
    }

    /// Serializes the current model (dropping rows that fail their own
    /// validation) and writes it back. On failure the in-memory edit is
    /// preserved so the operator can retry.
    pub fn save_config(&self, state: &mut PanelState) -> Result<()> {
        let text = state.render_config().to_string();
        match self
            .bridge
            .replace_file(&self.settings.config_path, &text, true)
        {
            Ok(()) => {
                state.push_notice(Severity::Success, "Configuration saved", Utc::now());
                Ok(())
            }
            Err(e) => {
                state.push_notice(
                    Severity::Danger,
                    format!("Failed to save configuration: {e}"),
                    Utc::now(),
                );
                Err(e).with_msg("Configuration save failed; the edit is kept in memory")
            }
        }
    }

    pub fn load_schedule(&self, state: &mut PanelState) {
        match self.bridge.read_file(&self.settings.schedule_path) {
            Ok(text) => {
                state.load_schedule_text(text);
                state.push_notice(Severity::Success, "Schedule loaded", Utc::now());
            }
            Err(e) => {
                tracing::warn!("Failed to load schedule: {e}");
                // Parsing the empty string yields the standard intervals,
                // disabled, with default timings.
                state.load_schedule_text(String::new());
                state.push_notice(
                    Severity::Danger,
                    format!("Failed to load schedule: {e}"),
                    Utc::now(),
                );
            }
        }
    }

    pub fn save_schedule(&self, state: &mut PanelState) -> Result<()> {
        let text = state.render_schedule().to_string();
        match self
            .bridge
            .replace_file(&self.settings.schedule_path, &text, true)
        {
            Ok(()) => {
                state.push_notice(Severity::Success, "Schedule saved", Utc::now());
                Ok(())
            }
            Err(e) => {
                state.push_notice(
                    Severity::Danger,
                    format!("Failed to save schedule: {e}"),
                    Utc::now(),
                );
                Err(e).with_msg("Schedule save failed; the edit is kept in memory")
            }
        }
    }

    /// Triggers an ad-hoc run of the tool for one interval, streaming its
    /// output. The outcome is mailed to the operator when a notification
    /// channel is configured; a notification failure is logged, never
    /// escalated.
    pub fn run_backup(&self, interval: &str, sink: OutputSink) -> Result<()> {
        let result = self
            .bridge
            .run_command(&[&self.settings.tool, interval], true, sink)
            .with_msg(format!("Backup run for interval {interval:?} failed"));

        if let Some(notification) = &self.settings.notification {
            let (topic, msg) = match &result {
                Ok(()) => (
                    format!("{}: {interval} backup finished", self.settings.tool),
                    format!("Ad-hoc {interval} run completed successfully"),
                ),
                Err(e) => (
                    format!("{}: {interval} backup failed", self.settings.tool),
                    e.to_string(),
                ),
            };
            if let Err(e) = notification.send(topic, msg) {
                tracing::warn!("Failed to send run notification: {e}");
            }
        }

        result
    }

    /// Returns the tool's log content. A missing log produces guidance
    /// about enabling logging rather than a bare read error.
    pub fn tail_log(&self) -> Result<String> {
        self.bridge
            .read_file(&self.settings.log_path)
            .with_msg(format!(
                "The log file {:?} does not exist or is unreadable. Check that logging is \
                 enabled in the configuration (logfile {})",
                self.settings.log_path,
                self.settings.log_path.display()
            ))
    }

    /// Runs the tool's own configuration check, streaming its verdict.
    pub fn config_test(&self, sink: OutputSink) -> Result<()> {
        self.bridge
            .run_command(&[&self.settings.tool, "configtest"], false, sink)
            .with_msg("Configuration test failed")
    }
}

/// Per-row validation messages across both models. Each failing row
/// reports independently; an empty result means every row may be
/// persisted as-is.
pub fn validation_failures(state: &PanelState) -> Vec<String> {
    let mut failures: Vec<String> = state
        .config
        .validate_rows()
        .into_iter()
        .map(|(row, errors)| format!("{row}: {errors}"))
        .collect();
    for entry in &state.schedule.entries {
        if let Err(errors) = entry.validate() {
            failures.push(format!("schedule {}: {errors}", entry.name));
        }
    }
    failures
}
