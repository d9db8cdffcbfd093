use crate::panel::notifications::NotificationConfig;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use validator::{Validate, ValidationError};

/// Operator-provided settings for the panel itself, loaded from YAML.
/// Defaults point at a stock rsnapshot installation.
#[skip_serializing_none]
#[derive(Clone, Serialize, Deserialize, Debug, Validate)]
#[serde(deny_unknown_fields)]
pub struct PanelSettings {
    /// The backup tool's configuration file.
    #[serde(default = "default_config_path")]
    pub config_path: Arc<Path>,
    /// The managed scheduler file.
    #[serde(default = "default_schedule_path")]
    pub schedule_path: Arc<Path>,
    /// Binary name of the administered tool.
    #[validate(custom(function = validate_tool_name))]
    #[serde(default = "default_tool")]
    pub tool: Arc<str>,
    /// Where the tool writes its log, for the log-tail action.
    #[serde(default = "default_log_path")]
    pub log_path: Arc<Path>,
    /// How long transient notices stay before being pruned.
    #[serde(default = "default_notice_ttl", with = "humantime_serde")]
    pub notice_ttl: Duration,
    /// Optional channel for run-outcome notifications.
    #[validate(nested)]
    pub notification: Option<NotificationConfig>,
}

fn default_config_path() -> Arc<Path> {
    PathBuf::from("/etc/rsnapshot.conf").into()
}

fn default_schedule_path() -> Arc<Path> {
    PathBuf::from("/etc/cron.d/rsnapshot").into()
}

fn default_tool() -> Arc<str> {
    "rsnapshot".into()
}

fn default_log_path() -> Arc<Path> {
    PathBuf::from("/var/log/rsnapshot.log").into()
}

fn default_notice_ttl() -> Duration {
    Duration::from_secs(5)
}

fn validate_tool_name(tool: &Arc<str>) -> std::result::Result<(), ValidationError> {
    if tool.is_empty() || tool.chars().any(|c| c == '/' || c == '\0' || c.is_whitespace()) {
        return Err(ValidationError::new("InvalidToolName").with_message(
            format!("Tool must be a bare binary name: {tool:?}").into(),
        ));
    }

    Ok(())
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            config_path: default_config_path(),
            schedule_path: default_schedule_path(),
            tool: default_tool(),
            log_path: default_log_path(),
            notice_ttl: default_notice_ttl(),
            notification: None,
        }
    }
}
