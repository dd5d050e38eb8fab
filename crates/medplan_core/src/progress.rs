use std::collections::BTreeMap;

use serde::Serialize;

use crate::date::DayKey;
use crate::schedule::TOTAL_DAYS;

/// Remaining-day count at or below which the renewal warning appears.
pub const WARNING_DAYS_REMAINING: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Tier {
    Normal,
    Warning,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSummary {
    pub completed_count: u32,
    pub percent: f64,
    pub tier: Tier,
}

impl ProgressSummary {
    pub fn days_remaining(&self) -> u32 {
        TOTAL_DAYS.saturating_sub(self.completed_count)
    }

    pub fn rounded_percent(&self) -> u32 {
        self.percent.round() as u32
    }

    /// Banner shown under the progress bar, if the tier calls for one.
    pub fn banner(&self) -> Option<String> {
        match self.tier {
            Tier::Normal => None,
            Tier::Warning => Some(format!(
                "Attention: {} days of treatment remain. Check whether your prescription needs renewing.",
                self.days_remaining()
            )),
            Tier::Complete => Some(format!(
                "Congratulations! You have completed the {TOTAL_DAYS}-day treatment."
            )),
        }
    }
}

/// Summarises a completion map. The percentage is left unrounded.
pub fn evaluate(days: &BTreeMap<DayKey, bool>) -> ProgressSummary {
    let completed_count = days.values().filter(|done| **done).count() as u32;
    summarize(completed_count)
}

pub(crate) fn summarize(completed_count: u32) -> ProgressSummary {
    let percent = f64::from(completed_count) / f64::from(TOTAL_DAYS) * 100.0;
    let remaining = TOTAL_DAYS.saturating_sub(completed_count);
    let tier = if completed_count >= TOTAL_DAYS {
        Tier::Complete
    } else if remaining <= WARNING_DAYS_REMAINING {
        Tier::Warning
    } else {
        Tier::Normal
    };
    ProgressSummary {
        completed_count,
        percent,
        tier,
    }
}
