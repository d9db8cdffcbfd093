use crate::panel::validate::{
    validate_exclude_pattern, validate_interval_name, validate_retain_count,
};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

/// One retention rule: how many generations of a named interval to keep.
///
/// A disabled entry round-trips as a commented-out line instead of being
/// deleted.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct RetentionEntry {
    #[validate(custom(function = validate_interval_name))]
    pub name: String,
    /// Kept as text until validated; a row with an invalid or empty count
    /// is dropped on serialization.
    #[validate(custom(function = validate_retain_count))]
    pub count: String,
    pub enabled: bool,
}

impl RetentionEntry {
    pub fn new<N: Into<String>, C: Into<String>>(name: N, count: C) -> Self {
        Self {
            name: name.into(),
            count: count.into(),
            enabled: true,
        }
    }

    pub fn disabled<N: Into<String>, C: Into<String>>(name: N, count: C) -> Self {
        Self {
            enabled: false,
            ..Self::new(name, count)
        }
    }

    /// Whether the row survives serialization.
    pub fn is_persistable(&self) -> bool {
        !self.name.is_empty() && validate_retain_count(&self.count).is_ok()
    }
}

/// One source/destination pair handed to the backup tool.
#[derive(Clone, Default, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackupJob {
    pub source: String,
    /// Target path, possibly host-qualified.
    pub destination: String,
    /// Tool-specific trailing flags, passed through verbatim.
    pub options: String,
}

impl BackupJob {
    pub fn new<S: Into<String>, D: Into<String>>(source: S, destination: D) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            options: String::new(),
        }
    }

    /// A job is valid only with both endpoints non-empty after trimming;
    /// invalid jobs are silently excluded from serialization.
    pub fn is_persistable(&self) -> bool {
        !self.source.trim().is_empty() && !self.destination.trim().is_empty()
    }
}

impl Validate for BackupJob {
    fn validate(&self) -> Result<(), ValidationErrors> {
        if self.is_persistable() {
            return Ok(());
        }
        let mut errors = ValidationErrors::new();
        if self.source.trim().is_empty() {
            errors.add(
                "source",
                ValidationError::new("InvalidBackupJob")
                    .with_message("Backup source must not be empty".into()),
            );
        }
        if self.destination.trim().is_empty() {
            errors.add(
                "destination",
                ValidationError::new("InvalidBackupJob")
                    .with_message("Backup destination must not be empty".into()),
            );
        }
        Err(errors)
    }
}

/// An exclusion rule, either a pattern given inline or a reference to a
/// file containing patterns.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "value")]
#[serde(rename_all = "snake_case")]
pub enum ExclusionPattern {
    Pattern(String),
    File(String),
}

impl ExclusionPattern {
    pub fn value(&self) -> &str {
        match self {
            Self::Pattern(v) | Self::File(v) => v,
        }
    }

    pub fn is_file_based(&self) -> bool {
        matches!(self, Self::File(_))
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Pattern(_) => "exclude",
            Self::File(_) => "exclude_file",
        }
    }

    pub fn is_persistable(&self) -> bool {
        !self.value().trim().is_empty()
    }
}

impl Validate for ExclusionPattern {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let checked = match self {
            // Inline patterns get the glob lint; file references only need
            // to name something.
            Self::Pattern(v) => validate_exclude_pattern(v),
            Self::File(v) => {
                if v.trim().is_empty() {
                    Err(ValidationError::new("InvalidExcludeFile")
                        .with_message("Exclusion file path must not be empty".into()))
                } else {
                    Ok(())
                }
            }
        };
        checked.map_err(|e| {
            let mut errors = ValidationErrors::new();
            errors.add("value", e);
            errors
        })
    }
}
