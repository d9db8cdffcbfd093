//! Validation functions for editable rows.
//!
//! Each function validates one field and reports through
//! `validator::ValidationError` so failures can be surfaced inline next to
//! the offending row without blocking unrelated rows.

use crate::panel::timing;
use chrono::Utc;
use globset::Glob;
use sanitize_filename::{is_sanitized, sanitize};
use validator::ValidationError;

pub fn validate_interval_name<S: AsRef<str>>(name: S) -> Result<(), ValidationError> {
    let name = name.as_ref();
    if name.is_empty() {
        return Err(ValidationError::new("InvalidIntervalName")
            .with_message("Interval name must not be empty".into()));
    }

    // Interval names end up as single tokens in both backing files and as
    // tool arguments.
    if name.chars().any(|c| c.is_whitespace() || c == '#') {
        return Err(ValidationError::new("InvalidIntervalName").with_message(
            format!("Interval name must not contain whitespace or '#': {name:?}").into(),
        ));
    }

    if !is_sanitized(name) {
        return Err(ValidationError::new("InvalidIntervalName").with_message(
            format!("Invalid interval name, try sanitizing like {:?}", sanitize(name)).into(),
        ));
    }

    Ok(())
}

pub fn validate_retain_count<S: AsRef<str>>(count: S) -> Result<(), ValidationError> {
    let count = count.as_ref();
    if count.is_empty() || !count.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new("InvalidRetainCount")
            .with_message(format!("Retain count must be a positive integer: {count:?}").into()));
    }

    if count.chars().all(|c| c == '0') {
        return Err(ValidationError::new("InvalidRetainCount")
            .with_message("Retain count must be greater than zero".into()));
    }

    Ok(())
}

pub fn validate_timing_expression<S: AsRef<str>>(expr: S) -> Result<(), ValidationError> {
    let expr = expr.as_ref();
    if !timing::is_valid_expression(expr) {
        return Err(ValidationError::new("InvalidTiming")
            .with_message(format!("Invalid timing expression: {expr:?}").into()));
    }

    Ok(())
}

/// Stricter check used for settings, where an expression must actually be
/// evaluable and not just lexically well-formed.
pub fn validate_cron_evaluable<S: AsRef<str>>(expr: S) -> Result<(), ValidationError> {
    let expr = expr.as_ref();
    let canonical = match timing::canonical_expression(expr.trim()) {
        // Non-periodic is evaluable in the sense that it never fires.
        None => return Ok(()),
        Some(canonical) => canonical,
    };
    if cron_parser::parse(canonical, &Utc::now()).is_err() {
        return Err(ValidationError::new("InvalidCron")
            .with_message(format!("Invalid cron string: {expr:?}").into()));
    }

    Ok(())
}

pub fn validate_exclude_pattern<S: AsRef<str>>(pattern: S) -> Result<(), ValidationError> {
    let pattern = pattern.as_ref();
    if pattern.trim().is_empty() {
        return Err(ValidationError::new("InvalidExcludePattern")
            .with_message("Exclusion pattern must not be empty".into()));
    }

    if let Err(e) = Glob::new(pattern) {
        return Err(ValidationError::new("InvalidExcludePattern")
            .with_message(format!("Pattern does not compile as a glob: {e}").into()));
    }

    Ok(())
}
