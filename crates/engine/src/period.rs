use chrono::{Datelike, Days, NaiveDate};

use crate::{EngineError, ResultEngine};

/// Resolved inclusive date range used for report aggregation.
///
/// Invariant: `from <= to`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Period {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl Period {
    /// Maps a textual period token to a concrete range, relative to `today`.
    ///
    /// Tokens are `day`, `week` or `month`, optionally followed by a
    /// non-negative offset:
    ///
    /// - `day` is today, `day N` a single day N days back;
    /// - `week` covers the last 7 days, `week N` the 7-day window ending
    ///   7·N days back;
    /// - `month` covers the current month up to today, `month N` the full
    ///   calendar month N months back.
    ///
    /// Anything else fails with [`EngineError::UnknownPeriod`].
    pub fn parse(token: &str, today: NaiveDate) -> ResultEngine<Period> {
        let unknown = || EngineError::UnknownPeriod(token.trim().to_string());

        let mut words = token.split_whitespace();
        let unit = words.next().ok_or_else(unknown)?.to_ascii_lowercase();
        let offset: u64 = match words.next() {
            Some(raw) => raw.parse().map_err(|_| unknown())?,
            None => 0,
        };
        if words.next().is_some() {
            return Err(unknown());
        }

        let period = match unit.as_str() {
            "day" => {
                let day = checked_back(today, offset)?;
                Period { from: day, to: day }
            }
            "week" => {
                let to = checked_back(today, 7 * offset)?;
                let from = checked_back(to, 6)?;
                Period { from, to }
            }
            "month" if offset == 0 => Period {
                from: first_of_month(today),
                to: today,
            },
            "month" => {
                let from = months_back(first_of_month(today), offset)
                    .ok_or_else(unknown)?;
                let to = last_of_month(from);
                Period { from, to }
            }
            _ => return Err(unknown()),
        };

        Ok(period)
    }

    /// The current-month window the limit check aggregates over:
    /// `[first day of the month, today]`, first day inclusive.
    #[must_use]
    pub fn this_month(today: NaiveDate) -> Period {
        Period {
            from: first_of_month(today),
            to: today,
        }
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date <= self.to
    }
}

fn checked_back(date: NaiveDate, days: u64) -> ResultEngine<NaiveDate> {
    date.checked_sub_days(Days::new(days))
        .ok_or_else(|| EngineError::UnknownPeriod(format!("{days} days back")))
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    // The first of an existing month always exists.
    date.with_day(1).unwrap_or(date)
}

fn last_of_month(first: NaiveDate) -> NaiveDate {
    let (year, month) = match first.month() {
        12 => (first.year() + 1, 1),
        m => (first.year(), m + 1),
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .unwrap_or(first)
}

fn months_back(first: NaiveDate, offset: u64) -> Option<NaiveDate> {
    let total = i64::from(first.year()) * 12 + i64::from(first.month0()) - offset as i64;
    if total < 0 {
        return None;
    }
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = (total.rem_euclid(12) + 1) as u32;
    NaiveDate::from_ymd_opt(year, month, 1)
}
