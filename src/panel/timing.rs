//! Timing expressions for schedule entries.
//!
//! An expression is either a shorthand token (`@daily`, ...) or a 5-field
//! cron string. Validation here is purely lexical; semantic checking is left
//! to the backup tool's own configtest.

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::Serialize;

/// The shorthand tokens understood by the scheduler.
pub static SHORTHAND_TOKENS: [&str; 7] = [
    "@reboot", "@yearly", "@annually", "@monthly", "@weekly", "@daily", "@hourly",
];

/// Character class allowed in each of the five cron fields.
fn is_field_char(c: char) -> bool {
    c.is_ascii_digit() || c == '*' || c == '/' || c == ',' || c == '-'
}

pub fn is_shorthand(expr: &str) -> bool {
    SHORTHAND_TOKENS.contains(&expr)
}

/// Lexical validation of a timing expression. Total: returns a boolean for
/// every input and never panics. Accepts semantically nonsensical but
/// well-formed strings like `99 99 99 99 99`.
pub fn is_valid_expression(expr: &str) -> bool {
    let expr = expr.trim();
    if is_shorthand(expr) {
        return true;
    }

    let fields: Vec<&str> = expr.split_whitespace().collect();
    fields.len() == 5
        && fields
            .iter()
            .all(|field| field.chars().all(is_field_char))
}

/// Expands a shorthand token to its canonical 5-field equivalent.
///
/// Returns `None` for `@reboot`, which denotes a non-periodic trigger with
/// no 5-field form. Non-shorthand input is returned unchanged.
pub fn canonical_expression(expr: &str) -> Option<&str> {
    match expr {
        "@reboot" => None,
        "@yearly" | "@annually" => Some("0 0 1 1 *"),
        "@monthly" => Some("0 0 1 * *"),
        "@weekly" => Some("0 0 * * 0"),
        "@daily" => Some("0 0 * * *"),
        "@hourly" => Some("0 * * * *"),
        other => Some(other),
    }
}

/// Outcome of the next-run computation. Display-only, never a persistence
/// gate.
#[derive(Clone, Debug, Display, Serialize, PartialEq, Eq)]
pub enum NextRun {
    /// Next scheduled instant in UTC.
    #[display("{}", _0.format("%Y-%m-%d %H:%M:%S UTC"))]
    At(DateTime<Utc>),
    /// The expression has no next instant (e.g. run at system boot).
    #[display("")]
    NonPeriodic,
    /// The expression could not be evaluated; carries the reason.
    #[display("cannot compute next run: {_0}")]
    Unevaluable(String),
}

/// Computes the next scheduled instant after `now` for a timing expression.
///
/// Shorthands are expanded through the canonical table first. Failures are
/// reported in the returned value rather than raised.
pub fn next_run(expr: &str, now: &DateTime<Utc>) -> NextRun {
    let expr = expr.trim();
    if !is_valid_expression(expr) {
        return NextRun::Unevaluable(format!("not a timing expression: {expr:?}"));
    }

    match canonical_expression(expr) {
        None => NextRun::NonPeriodic,
        Some(canonical) => match cron_parser::parse(canonical, now) {
            Ok(dt) => NextRun::At(dt),
            Err(e) => NextRun::Unevaluable(e.to_string()),
        },
    }
}
