use chrono::NaiveDate;
use serde::Serialize;

use crate::plan::DayRow;
use crate::progress::ProgressSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Success,
}

/// A transient message shown after a user action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub text: String,
    pub severity: Severity,
}

impl Notice {
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Error,
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Success,
        }
    }
}

/// Everything a surface needs to draw the checklist and progress section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleView {
    pub rows: Vec<DayRow>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub progress: ProgressSummary,
}

/// Rendering adapters (terminal, GUI, test doubles) implement this trait.
pub trait DisplaySurface {
    fn render(&mut self, view: &ScheduleView);
    fn notify(&mut self, notice: &Notice);
    /// Blocking yes/no gate for destructive actions.
    fn confirm(&mut self, prompt: &str) -> bool;
    /// Hides the schedule and progress section.
    fn reset(&mut self);
    fn print(&mut self, view: &ScheduleView);
}
