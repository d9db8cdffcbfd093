//! The scheduler file: one managed line per interval, of the form
//! `<timing> root /usr/bin/<tool> <interval>`, `#`-prefixed when disabled.
//!
//! The managed file always begins with a fixed ownership banner. Lines that
//! do not match the command pattern are preserved verbatim, mirroring the
//! configuration parser's passthrough behavior.

use crate::panel::validate::{validate_interval_name, validate_timing_expression};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Ownership banner emitted as the first line of the managed file.
pub static SCHEDULE_BANNER: &str = "# Managed by snapadmin";

/// Standard recurrence tiers and their default timing expressions.
pub static STANDARD_INTERVALS: [(&str, &str); 4] = [
    ("hourly", "0 * * * *"),
    ("daily", "30 3 * * *"),
    ("weekly", "0 3 * * 1"),
    ("monthly", "30 2 1 * *"),
];

/// One recurring-execution rule. A disabled entry is kept as a
/// commented-out line, never deleted.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct ScheduleEntry {
    #[validate(custom(function = validate_interval_name))]
    pub name: String,
    #[validate(custom(function = validate_timing_expression))]
    pub timing: String,
    pub enabled: bool,
}

impl ScheduleEntry {
    pub fn new<N: Into<String>, T: Into<String>>(name: N, timing: T, enabled: bool) -> Self {
        Self {
            name: name.into(),
            timing: timing.into(),
            enabled,
        }
    }
}

/// Structured form of the scheduler file for one backup tool.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleFile {
    /// Binary name the managed lines invoke.
    pub tool: String,
    pub entries: Vec<ScheduleEntry>,
    pub passthrough: Vec<String>,
}

/// Splits a managed line into (interval, timing, enabled). The timing is
/// everything before the privileged-user token.
fn parse_managed_line(line: &str, tool: &str) -> Option<(String, String, bool)> {
    let trimmed = line.trim();
    let (enabled, body) = match trimmed.strip_prefix('#') {
        Some(rest) => (false, rest.trim()),
        None => (true, trimmed),
    };

    let tokens: Vec<&str> = body.split_whitespace().collect();
    let pos = tokens.iter().position(|t| *t == "root")?;
    if pos == 0 || tokens.len() != pos + 3 {
        return None;
    }

    let (path, interval) = (tokens[pos + 1], tokens[pos + 2]);
    if path != tool && !path.ends_with(&format!("/{tool}")) {
        return None;
    }

    Some((interval.to_string(), tokens[..pos].join(" "), enabled))
}

impl ScheduleFile {
    /// The standard intervals, all disabled, with default timings. Used
    /// when the backing file is missing or unreadable.
    pub fn with_defaults<S: Into<String>>(tool: S) -> Self {
        Self {
            tool: tool.into(),
            entries: STANDARD_INTERVALS
                .iter()
                .map(|(name, timing)| ScheduleEntry::new(*name, *timing, false))
                .collect(),
            passthrough: Vec::new(),
        }
    }

    pub fn parse(text: &str, tool: &str) -> Self {
        let mut file = Self {
            tool: tool.to_string(),
            entries: Vec::new(),
            passthrough: Vec::new(),
        };
        for raw in text.lines() {
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed == SCHEDULE_BANNER {
                continue;
            }
            match parse_managed_line(raw, tool) {
                Some((name, timing, enabled)) => {
                    file.upsert_entry(ScheduleEntry::new(name, timing, enabled))
                }
                None => file.passthrough.push(raw.to_string()),
            }
        }
        file.ensure_standard_entries();
        file
    }

    fn ensure_standard_entries(&mut self) {
        for (name, timing) in STANDARD_INTERVALS {
            if self.entry(name).is_none() {
                self.entries.push(ScheduleEntry::new(name, timing, false));
            }
        }
    }

    pub fn entry(&self, name: &str) -> Option<&ScheduleEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Last occurrence wins; the entry stays at the first occurrence's
    /// position.
    pub fn upsert_entry(&mut self, entry: ScheduleEntry) {
        match self.entries.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => {
                entry.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn set_timing<T: Into<String>>(&mut self, name: &str, timing: T) -> bool {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => {
                entry.timing = timing.into();
                true
            }
            None => false,
        }
    }

    /// Interval names with an enabled entry, in scan order.
    pub fn active_intervals(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.enabled)
            .map(|e| e.name.clone())
            .collect()
    }

    fn entries_in_emit_order(&self) -> Vec<&ScheduleEntry> {
        let mut ordered = Vec::with_capacity(self.entries.len());
        for (name, _) in STANDARD_INTERVALS {
            if let Some(entry) = self.entry(name) {
                ordered.push(entry);
            }
        }
        for entry in &self.entries {
            if !STANDARD_INTERVALS.iter().any(|(name, _)| *name == entry.name) {
                ordered.push(entry);
            }
        }
        ordered
    }

    /// Reconstructs the file: banner, one line per entry (standard tiers
    /// first, then customs), commented out when disabled, then passthrough.
    pub fn serialize(&self) -> String {
        let mut lines = vec![SCHEDULE_BANNER.to_string()];
        for entry in self.entries_in_emit_order() {
            let line = format!("{} root /usr/bin/{} {}", entry.timing, self.tool, entry.name);
            lines.push(if entry.enabled { line } else { format!("#{line}") });
        }
        lines.extend(self.passthrough.iter().cloned());

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commented_line_recovered_as_disabled() {
        let file = ScheduleFile::parse("#0 3 * * * root /usr/bin/tool daily\n", "tool");
        let entry = file.entry("daily").unwrap();
        assert_eq!(entry.name, "daily");
        assert!(!entry.enabled);
        assert_eq!(entry.timing, "0 3 * * *");
    }

    #[test]
    fn test_parse_active_line() {
        let file = ScheduleFile::parse("30 3 * * * root /usr/bin/rsnapshot daily\n", "rsnapshot");
        let entry = file.entry("daily").unwrap();
        assert!(entry.enabled);
        assert_eq!(entry.timing, "30 3 * * *");
    }

    #[test]
    fn test_missing_standard_intervals_get_defaults() {
        let file = ScheduleFile::parse("", "rsnapshot");
        for (name, timing) in STANDARD_INTERVALS {
            let entry = file.entry(name).unwrap();
            assert!(!entry.enabled);
            assert_eq!(entry.timing, timing);
        }
    }

    #[test]
    fn test_with_defaults_matches_empty_parse() {
        assert_eq!(
            ScheduleFile::with_defaults("rsnapshot"),
            ScheduleFile::parse("", "rsnapshot")
        );
    }

    #[test]
    fn test_foreign_tool_line_is_passthrough() {
        let file = ScheduleFile::parse("0 2 * * * root /usr/bin/updatedb nightly\n", "rsnapshot");
        assert_eq!(
            file.passthrough,
            vec!["0 2 * * * root /usr/bin/updatedb nightly"]
        );
        assert!(file.entry("nightly").is_none());
    }

    #[test]
    fn test_unmatched_lines_preserved() {
        let text = "MAILTO=admin@example.com\n# a note\n0 * * * * root /usr/bin/rsnapshot hourly\n";
        let file = ScheduleFile::parse(text, "rsnapshot");
        assert_eq!(file.passthrough, vec!["MAILTO=admin@example.com", "# a note"]);
        let out = file.serialize();
        assert!(out.contains("MAILTO=admin@example.com\n"));
        assert!(out.contains("# a note\n"));
    }

    #[test]
    fn test_banner_not_treated_as_passthrough() {
        let file = ScheduleFile::parse("# Managed by snapadmin\n", "rsnapshot");
        assert!(file.passthrough.is_empty());
    }

    #[test]
    fn test_serialize_emits_banner_and_fixed_order() {
        let mut file = ScheduleFile::with_defaults("rsnapshot");
        file.set_enabled("daily", true);
        let out = file.serialize();
        assert_eq!(
            out,
            "# Managed by snapadmin\n\
             #0 * * * * root /usr/bin/rsnapshot hourly\n\
             30 3 * * * root /usr/bin/rsnapshot daily\n\
             #0 3 * * 1 root /usr/bin/rsnapshot weekly\n\
             #30 2 1 * * root /usr/bin/rsnapshot monthly\n"
        );
    }

    #[test]
    fn test_round_trip() {
        let mut file = ScheduleFile::with_defaults("rsnapshot");
        file.set_enabled("hourly", true);
        file.set_timing("hourly", "15 * * * *");
        file.upsert_entry(ScheduleEntry::new("offsite", "@weekly", true));

        let reparsed = ScheduleFile::parse(&file.serialize(), "rsnapshot");
        assert_eq!(reparsed.entry("hourly"), file.entry("hourly"));
        assert_eq!(reparsed.entry("offsite"), file.entry("offsite"));
        assert_eq!(reparsed.serialize(), file.serialize());
    }

    #[test]
    fn test_custom_interval_emitted_after_standard_tiers() {
        let mut file = ScheduleFile::with_defaults("rsnapshot");
        file.upsert_entry(ScheduleEntry::new("offsite", "0 4 * * 6", true));
        let out = file.serialize();
        let offsite_pos = out.find("offsite").unwrap();
        let monthly_pos = out.find("monthly").unwrap();
        assert!(offsite_pos > monthly_pos);
    }

    #[test]
    fn test_active_intervals_in_scan_order() {
        let text = "0 * * * * root /usr/bin/rsnapshot hourly\n\
                    #30 3 * * * root /usr/bin/rsnapshot daily\n\
                    0 3 * * 1 root /usr/bin/rsnapshot weekly\n";
        let file = ScheduleFile::parse(text, "rsnapshot");
        assert_eq!(
            file.active_intervals(),
            vec!["hourly".to_string(), "weekly".to_string()]
        );
    }

    #[test]
    fn test_bare_tool_name_accepted() {
        let file = ScheduleFile::parse("0 * * * * root rsnapshot hourly\n", "rsnapshot");
        assert!(file.entry("hourly").unwrap().enabled);
    }

    #[test]
    fn test_shorthand_timing_round_trips() {
        let file = ScheduleFile::parse("@daily root /usr/bin/rsnapshot daily\n", "rsnapshot");
        assert_eq!(file.entry("daily").unwrap().timing, "@daily");
    }
}
