// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{LedgerError, LedgerResult};
use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DAILY" => Ok(Frequency::Daily),
            "WEEKLY" => Ok(Frequency::Weekly),
            "MONTHLY" => Ok(Frequency::Monthly),
            "YEARLY" => Ok(Frequency::Yearly),
            _ => Err(LedgerError::UnsupportedFrequency(s.to_string())),
        }
    }
}

/// Calendar-unit addition. Month and year steps clamp to the last day of the
/// target month, so Jan 31 + 1 month is Feb 29 in a leap year and Feb 28
/// otherwise.
pub fn next_due_date(due: NaiveDate, frequency: Frequency) -> LedgerResult<NaiveDate> {
    let next = match frequency {
        Frequency::Daily => due.checked_add_days(Days::new(1)),
        Frequency::Weekly => due.checked_add_days(Days::new(7)),
        Frequency::Monthly => due.checked_add_months(Months::new(1)),
        Frequency::Yearly => due.checked_add_months(Months::new(12)),
    };
    next.ok_or_else(|| LedgerError::InvalidAmount(format!("date overflow after {due}")))
}

/// The next occurrence after `due`, or `None` once it would pass `end`.
pub fn next_occurrence(
    due: NaiveDate,
    frequency: Frequency,
    end: Option<NaiveDate>,
) -> LedgerResult<Option<NaiveDate>> {
    let next = next_due_date(due, frequency)?;
    Ok(match end {
        Some(end) if next > end => None,
        _ => Some(next),
    })
}

/// First `day`-of-month on or after `from`; `day` is clamped to 1..=28 so it
/// exists in every month.
pub fn next_day_of_month(from: NaiveDate, day: u32) -> LedgerResult<NaiveDate> {
    use chrono::Datelike;
    let day = day.clamp(1, 28);
    let this_month = NaiveDate::from_ymd_opt(from.year(), from.month(), day)
        .ok_or_else(|| LedgerError::InvalidAmount(format!("invalid day {day}")))?;
    if this_month >= from {
        return Ok(this_month);
    }
    this_month
        .checked_add_months(Months::new(1))
        .ok_or_else(|| LedgerError::InvalidAmount(format!("date overflow after {from}")))
}
