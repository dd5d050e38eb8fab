use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::date::{self, DayKey};
use crate::error::{PlanError, Result};
use crate::plan::{DayRow, Plan};

/// Length of the treatment window in days.
pub const TOTAL_DAYS: u32 = 60;

/// A freshly generated checklist together with the plan to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    pub rows: Vec<DayRow>,
    pub plan: Plan,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Builds the 60-day checklist starting at `start_input`.
///
/// Every day whose key is at or before `today` is pre-checked, including
/// today itself. Completion flags of any earlier plan are not consulted:
/// regenerating always resets to this rule.
///
/// A window whose last day falls after 9999-12-31 is an [`PlanError::InvalidDate`].
pub fn generate(start_input: &str, today: NaiveDate) -> Result<Schedule> {
    if start_input.trim().is_empty() {
        return Err(PlanError::InvalidInput);
    }
    let start_date = date::parse_day_key(start_input)?;
    let today_key = date::day_key(today);

    let mut rows = Vec::with_capacity(TOTAL_DAYS as usize);
    let mut days: BTreeMap<DayKey, bool> = BTreeMap::new();
    for offset in 0..TOTAL_DAYS {
        let current = date::add_days(start_date, offset)
            .ok_or_else(|| PlanError::InvalidDate(start_input.to_string()))?;
        let key = date::day_key(current);
        let completed = key <= today_key;
        days.insert(key.clone(), completed);
        rows.push(DayRow {
            day_number: offset + 1,
            date: current,
            key,
            completed,
        });
    }

    let end_date = rows.last().map(|row| row.date).unwrap_or(start_date);
    debug!(
        start = %start_date,
        end = %end_date,
        today = %today_key,
        "generated schedule"
    );

    Ok(Schedule {
        rows,
        plan: Plan {
            start_date: date::day_key(start_date),
            days,
        },
        start_date,
        end_date,
    })
}
