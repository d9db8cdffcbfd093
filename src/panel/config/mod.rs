//! The backup tool's line-oriented configuration file, as a structured
//! model.
//!
//! Parsing never fails: unrecognized or malformed lines degrade to verbatim
//! passthrough instead of raising, and a commented-out retention line is
//! recovered as a disabled entry so it survives a round trip.

pub mod entry;

use crate::panel::config::entry::{BackupJob, ExclusionPattern, RetentionEntry};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use validator::{Validate, ValidationErrors};

static KW_SNAPSHOT_ROOT: &str = "snapshot_root";
static KW_LOGFILE: &str = "logfile";
static KW_VERBOSE: &str = "verbose";
static KW_RETAIN: &str = "retain";
/// Legacy spelling of `retain`, accepted on input only.
static KW_INTERVAL: &str = "interval";
static KW_BACKUP: &str = "backup";
static KW_EXCLUDE: &str = "exclude";
static KW_EXCLUDE_FILE: &str = "exclude_file";

/// Structured form of the configuration file. Built fresh on every load,
/// held in memory for the edit session, discarded on reload.
#[skip_serializing_none]
#[derive(Clone, Default, Debug, Serialize, Deserialize, PartialEq)]
pub struct SnapshotConfig {
    pub snapshot_root: Option<String>,
    pub logfile: Option<String>,
    pub verbose: Option<String>,
    pub retention: Vec<RetentionEntry>,
    pub backups: Vec<BackupJob>,
    pub exclusions: Vec<ExclusionPattern>,
    /// Lines the grammar does not recognize, kept verbatim in original
    /// relative order.
    pub passthrough: Vec<String>,
}

fn retention_fields(trimmed: &str) -> Option<(&str, &str)> {
    match trimmed.split_whitespace().collect::<Vec<_>>().as_slice() {
        [kw, name, count] if *kw == KW_RETAIN || *kw == KW_INTERVAL => Some((*name, *count)),
        _ => None,
    }
}

impl SnapshotConfig {
    pub fn parse(text: &str) -> Self {
        let mut config = Self::default();
        for raw in text.lines() {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            if let Some(rest) = trimmed.strip_prefix('#') {
                // A commented-out retention declaration is a disabled
                // entry; any other comment is preserved untouched.
                match retention_fields(rest.trim()) {
                    Some((name, count)) => {
                        config.upsert_retention(RetentionEntry::disabled(name, count))
                    }
                    None => config.passthrough.push(raw.to_string()),
                }
                continue;
            }
            if !config.parse_recognized(trimmed) {
                config.passthrough.push(raw.to_string());
            }
        }
        config
    }

    fn parse_recognized(&mut self, trimmed: &str) -> bool {
        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        match fields.as_slice() {
            [kw, rest @ ..] if *kw == KW_SNAPSHOT_ROOT && !rest.is_empty() => {
                self.snapshot_root = Some(rest.join(" "));
            }
            [kw, rest @ ..] if *kw == KW_LOGFILE && !rest.is_empty() => {
                self.logfile = Some(rest.join(" "));
            }
            [kw, rest @ ..] if *kw == KW_VERBOSE && !rest.is_empty() => {
                self.verbose = Some(rest.join(" "));
            }
            [kw, name, count] if *kw == KW_RETAIN || *kw == KW_INTERVAL => {
                self.upsert_retention(RetentionEntry::new(*name, *count));
            }
            [kw, source, destination, options @ ..] if *kw == KW_BACKUP => {
                self.backups.push(BackupJob {
                    source: source.to_string(),
                    destination: destination.to_string(),
                    options: options.join(" "),
                });
            }
            [kw, rest @ ..] if *kw == KW_EXCLUDE_FILE && !rest.is_empty() => {
                self.exclusions.push(ExclusionPattern::File(rest.join(" ")));
            }
            [kw, rest @ ..] if *kw == KW_EXCLUDE && !rest.is_empty() => {
                self.exclusions.push(ExclusionPattern::Pattern(rest.join(" ")));
            }
            _ => return false,
        }
        true
    }

    /// Last occurrence wins; the entry stays at the first occurrence's
    /// position.
    pub fn upsert_retention(&mut self, entry: RetentionEntry) {
        match self.retention.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) => *existing = entry,
            None => self.retention.push(entry),
        }
    }

    pub fn set_retention_enabled(&mut self, name: &str, enabled: bool) -> bool {
        match self.retention.iter_mut().find(|e| e.name == name) {
            Some(entry) => {
                entry.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Interval names with an enabled, persistable retention entry.
    pub fn active_intervals(&self) -> Vec<String> {
        self.retention
            .iter()
            .filter(|e| e.enabled && e.is_persistable())
            .map(|e| e.name.clone())
            .collect()
    }

    /// Per-row validation results; each failing row reports independently
    /// so one bad row does not block the others.
    pub fn validate_rows(&self) -> Vec<(String, ValidationErrors)> {
        let mut failures = Vec::new();
        for entry in &self.retention {
            if let Err(errors) = entry.validate() {
                failures.push((format!("{KW_RETAIN} {}", entry.name), errors));
            }
        }
        for job in &self.backups {
            if let Err(errors) = job.validate() {
                failures.push((format!("{KW_BACKUP} {}", job.source), errors));
            }
        }
        for exclusion in &self.exclusions {
            if let Err(errors) = exclusion.validate() {
                failures.push((
                    format!("{} {}", exclusion.keyword(), exclusion.value()),
                    errors,
                ));
            }
        }
        failures
    }

    /// Reconstructs configuration text: recognized lines in fixed order,
    /// tab-joined, then passthrough verbatim. Always a finite sequence of
    /// newline-terminated lines; never fails.
    pub fn serialize(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        if let Some(root) = &self.snapshot_root {
            lines.push(format!("{KW_SNAPSHOT_ROOT}\t{root}"));
        }
        if let Some(logfile) = &self.logfile {
            lines.push(format!("{KW_LOGFILE}\t{logfile}"));
        }
        if let Some(verbose) = &self.verbose {
            lines.push(format!("{KW_VERBOSE}\t{verbose}"));
        }
        for entry in &self.retention {
            if !entry.is_persistable() {
                continue;
            }
            let line = format!("{KW_RETAIN}\t{}\t{}", entry.name, entry.count);
            lines.push(if entry.enabled { line } else { format!("#{line}") });
        }
        for job in &self.backups {
            if !job.is_persistable() {
                continue;
            }
            let mut line = format!(
                "{KW_BACKUP}\t{}\t{}",
                job.source.trim(),
                job.destination.trim()
            );
            if !job.options.trim().is_empty() {
                line.push('\t');
                line.push_str(job.options.trim());
            }
            lines.push(line);
        }
        for exclusion in &self.exclusions {
            if exclusion.is_persistable() {
                lines.push(format!("{}\t{}", exclusion.keyword(), exclusion.value().trim()));
            }
        }
        lines.extend(self.passthrough.iter().cloned());

        if lines.is_empty() {
            String::new()
        } else {
            let mut out = lines.join("\n");
            out.push('\n');
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scenario_and_byte_identical_round_trip() {
        let text = "snapshot_root\t/backup\nretain\tdaily\t7\n";
        let config = SnapshotConfig::parse(text);

        assert_eq!(config.snapshot_root.as_deref(), Some("/backup"));
        assert_eq!(config.retention.len(), 1);
        assert_eq!(config.retention[0], RetentionEntry::new("daily", "7"));

        assert_eq!(config.serialize(), text);
    }

    #[test]
    fn test_parse_accepts_spaces_and_emits_tabs() {
        let config = SnapshotConfig::parse("snapshot_root   /backup\nretain daily 7\n");
        assert_eq!(config.serialize(), "snapshot_root\t/backup\nretain\tdaily\t7\n");
    }

    #[test]
    fn test_parse_never_fails_on_malformed_lines() {
        let text = "retain\nbackup onlyone\nsnapshot_root\ngarbage here\n";
        let config = SnapshotConfig::parse(text);
        assert!(config.retention.is_empty());
        assert!(config.backups.is_empty());
        assert!(config.snapshot_root.is_none());
        assert_eq!(config.passthrough.len(), 4);
    }

    #[test]
    fn test_passthrough_preserved_verbatim() {
        let text = "snapshot_root\t/backup\n\tweird   line  with\ttabs\n";
        let config = SnapshotConfig::parse(text);
        assert_eq!(config.passthrough, vec!["\tweird   line  with\ttabs"]);
        assert!(config.serialize().contains("\tweird   line  with\ttabs\n"));
    }

    #[test]
    fn test_idempotence() {
        let text = "verbose 3\nretain hourly 6\nbackup /home/ localhost/ one_fs=1\nexclude *.tmp\nsome passthrough line\n";
        let once = SnapshotConfig::parse(text).serialize();
        let twice = SnapshotConfig::parse(&once).serialize();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_round_trip_recognized_fields() {
        let mut config = SnapshotConfig::default();
        config.snapshot_root = Some("/backup".into());
        config.logfile = Some("/var/log/rsnapshot.log".into());
        config.verbose = Some("2".into());
        config.retention.push(RetentionEntry::new("hourly", "6"));
        config.retention.push(RetentionEntry::disabled("daily", "7"));
        config.backups.push(BackupJob::new("/home/", "localhost/"));
        config
            .exclusions
            .push(ExclusionPattern::Pattern("*.cache".into()));
        config
            .exclusions
            .push(ExclusionPattern::File("/etc/rsnapshot.excludes".into()));

        let reparsed = SnapshotConfig::parse(&config.serialize());
        assert_eq!(reparsed, config);
    }

    #[test]
    fn test_blank_lines_and_plain_comments() {
        let text = "\n# hand-written note\nsnapshot_root\t/backup\n\n";
        let config = SnapshotConfig::parse(text);
        // Blank lines vanish, the comment survives as passthrough.
        assert_eq!(config.passthrough, vec!["# hand-written note"]);
        assert_eq!(
            config.serialize(),
            "snapshot_root\t/backup\n# hand-written note\n"
        );
    }

    #[test]
    fn test_commented_retention_recovered_as_disabled() {
        let config = SnapshotConfig::parse("#retain\tweekly\t4\n");
        assert_eq!(config.retention, vec![RetentionEntry::disabled("weekly", "4")]);
        assert!(config.passthrough.is_empty());
        assert_eq!(config.serialize(), "#retain\tweekly\t4\n");
    }

    #[test]
    fn test_commented_retention_with_space_after_hash() {
        let config = SnapshotConfig::parse("# interval monthly 3\n");
        assert_eq!(
            config.retention,
            vec![RetentionEntry::disabled("monthly", "3")]
        );
    }

    #[test]
    fn test_interval_alias_normalized_to_retain() {
        let config = SnapshotConfig::parse("interval\tdaily\t7\n");
        assert_eq!(config.retention, vec![RetentionEntry::new("daily", "7")]);
        assert_eq!(config.serialize(), "retain\tdaily\t7\n");
    }

    #[test]
    fn test_duplicate_retention_last_wins_keeps_position() {
        let config = SnapshotConfig::parse("retain daily 7\nretain weekly 4\nretain daily 14\n");
        assert_eq!(
            config.retention,
            vec![
                RetentionEntry::new("daily", "14"),
                RetentionEntry::new("weekly", "4"),
            ]
        );
    }

    #[test]
    fn test_empty_count_not_emitted() {
        let mut config = SnapshotConfig::default();
        config.retention.push(RetentionEntry::new("daily", ""));
        assert_eq!(config.serialize(), "");
    }

    #[test]
    fn test_invalid_job_silently_excluded() {
        let mut config = SnapshotConfig::default();
        config.backups.push(BackupJob::new("/home/", ""));
        config.backups.push(BackupJob::new("/etc/", "localhost/"));
        assert_eq!(config.serialize(), "backup\t/etc/\tlocalhost/\n");
    }

    #[test]
    fn test_backup_options_joined_by_single_spaces() {
        let config =
            SnapshotConfig::parse("backup\t/home/\tlocalhost/\tone_fs=1   rsync_long_args=--delete\n");
        assert_eq!(
            config.backups[0].options,
            "one_fs=1 rsync_long_args=--delete"
        );
        assert_eq!(
            config.serialize(),
            "backup\t/home/\tlocalhost/\tone_fs=1 rsync_long_args=--delete\n"
        );
    }

    #[test]
    fn test_active_intervals_skip_disabled_and_invalid() {
        let config = SnapshotConfig::parse("retain daily 7\n#retain weekly 4\nretain broken x\n");
        assert_eq!(config.active_intervals(), vec!["daily".to_string()]);
    }

    #[test]
    fn test_validate_rows_reports_only_bad_rows() {
        let config = SnapshotConfig::parse("retain daily 7\nretain broken x\n");
        let failures = config.validate_rows();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "retain broken");
    }

    #[test]
    fn test_set_retention_enabled() {
        let mut config = SnapshotConfig::parse("retain daily 7\n");
        assert!(config.set_retention_enabled("daily", false));
        assert_eq!(config.serialize(), "#retain\tdaily\t7\n");
        assert!(!config.set_retention_enabled("weekly", false));
    }
}
