use std::fmt;
use std::ops::RangeInclusive;

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PlanError, Result};

const KEY_FORMAT: &str = "%Y-%m-%d";
const DISPLAY_FORMAT: &str = "%d/%m/%Y";
/// Years that `%Y` renders as exactly four digits.
const KEY_YEARS: RangeInclusive<i32> = 0..=9999;

/// Canonical `YYYY-MM-DD` identifier of a calendar day.
///
/// The format is zero padded, so the lexicographic order of keys is the
/// chronological order of the days they name. Keys are only ever built from a
/// [`NaiveDate`] or from a string that survives a strict parse, which keeps
/// that property intact for every key in a plan.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DayKey(String);

impl DayKey {
    pub fn parse(input: &str) -> Result<Self> {
        parse_day_key(input).map(day_key)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DayKey {
    type Error = PlanError;

    fn try_from(value: String) -> Result<Self> {
        DayKey::parse(&value)
    }
}

impl From<DayKey> for String {
    fn from(key: DayKey) -> Self {
        key.0
    }
}

impl PartialEq<str> for DayKey {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for DayKey {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Key for a calendar day. Time of day never enters the key.
pub fn day_key(date: NaiveDate) -> DayKey {
    DayKey(date.format(KEY_FORMAT).to_string())
}

/// Key for the UTC calendar day containing `instant`.
pub fn day_key_utc(instant: DateTime<Utc>) -> DayKey {
    day_key(instant.date_naive())
}

/// Day/month/year rendering used in tables and headers, e.g. `05/01/2024`.
pub fn format_display(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

/// Parses a canonical key into the calendar day built from its year, month
/// and day fields.
///
/// Non-canonical spellings such as `2024-1-5` or `+2024-01-05` are rejected
/// even where chrono would accept them, and so are years outside `0000..=9999`.
pub fn parse_day_key(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    let date = NaiveDate::parse_from_str(trimmed, KEY_FORMAT)
        .map_err(|_| PlanError::InvalidDate(input.to_string()))?;
    if !KEY_YEARS.contains(&date.year()) || date.format(KEY_FORMAT).to_string() != trimmed {
        return Err(PlanError::InvalidDate(input.to_string()));
    }
    Ok(date)
}

/// Calendar-field addition. Returns `None` once the result leaves the years a
/// [`DayKey`] can spell.
pub fn add_days(date: NaiveDate, days: u32) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(u64::from(days)))
        .filter(|next| KEY_YEARS.contains(&next.year()))
}
