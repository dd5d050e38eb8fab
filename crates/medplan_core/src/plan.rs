use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use crate::date::DayKey;

/// The persisted record: a treatment window and one completion flag per day.
///
/// Serialized as `{"startDate":"YYYY-MM-DD","days":{"YYYY-MM-DD":bool,...}}`.
/// `days` is keyed by [`DayKey`], so iteration and serialization both follow
/// calendar order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub start_date: DayKey,
    pub days: BTreeMap<DayKey, bool>,
}

impl Plan {
    pub fn completed_count(&self) -> usize {
        self.days.values().filter(|done| **done).count()
    }
}

/// One line of the checklist. Computed on every generation, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayRow {
    pub day_number: u32,
    pub date: NaiveDate,
    pub key: DayKey,
    pub completed: bool,
}
