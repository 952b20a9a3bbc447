//! Validation of the raw command arguments: sums, limits and dates.

use chrono::NaiveDate;

use crate::{EngineError, ResultEngine};

/// Format purchases are dated with: `DD.MM.YYYY`.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Parses a non-negative decimal amount.
///
/// Only ASCII digits and at most one `.` separator are accepted, so inputs
/// like `12o.o5`, `1e5` or `-3` fail with [`EngineError::SummaParsing`]
/// instead of whatever the float grammar would tolerate.
pub fn parse_sum(raw: &str) -> ResultEngine<f64> {
    let trimmed = raw.trim();
    let well_formed = !trimmed.is_empty()
        && trimmed.chars().any(|c| c.is_ascii_digit())
        && trimmed.chars().all(|c| c.is_ascii_digit() || c == '.')
        && trimmed.chars().filter(|c| *c == '.').count() <= 1;
    if !well_formed {
        return Err(EngineError::SummaParsing(trimmed.to_string()));
    }

    trimmed
        .parse::<f64>()
        .map_err(|_| EngineError::SummaParsing(trimmed.to_string()))
}

/// Parses a monthly limit. Same grammar as [`parse_sum`], distinct error.
pub fn parse_limit(raw: &str) -> ResultEngine<f64> {
    parse_sum(raw).map_err(|_| EngineError::LimitParsing(raw.trim().to_string()))
}

/// Parses a `DD.MM.YYYY` date, requiring a valid calendar date.
pub fn parse_date(raw: &str) -> ResultEngine<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| EngineError::DateParsing(trimmed.to_string()))
}

/// Formats an amount the way replies and reports print money.
#[must_use]
pub fn format_sum(value: f64) -> String {
    format!("{value:.2}")
}
