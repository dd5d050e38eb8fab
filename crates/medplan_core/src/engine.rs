use tracing::{debug, info, instrument, warn};

use crate::clock::{Clock, SystemClock};
use crate::date;
use crate::display::{DisplaySurface, Notice, ScheduleView, Severity};
use crate::error::PlanError;
use crate::progress;
use crate::schedule;
use crate::store::{KeyValueStore, MemoryStore, PlanStore};
use crate::transfer;

pub const CLEAR_PROMPT: &str = "Are you sure you want to delete all data?";

/// Transient state owned by the engine between user actions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    /// Current value of the start-date picker.
    pub start_input: String,
    /// The schedule on display, if any.
    pub view: Option<ScheduleView>,
    pub last_notice: Option<Notice>,
}

/// Owns the plan store and view state; one method per user action.
///
/// Every handler runs to completion against the injected surface and turns
/// its failures into a [`Notice`] instead of returning them.
pub struct ScheduleEngine {
    store: PlanStore,
    clock: Box<dyn Clock>,
    state: ViewState,
}

pub struct ScheduleEngineBuilder {
    backend: Option<Box<dyn KeyValueStore>>,
    clock: Option<Box<dyn Clock>>,
}

impl ScheduleEngineBuilder {
    pub fn new() -> Self {
        Self {
            backend: None,
            clock: None,
        }
    }

    pub fn with_store(mut self, backend: Box<dyn KeyValueStore>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> ScheduleEngine {
        let clock = self.clock.unwrap_or_else(|| Box::new(SystemClock));
        let backend = self
            .backend
            .unwrap_or_else(|| Box::new(MemoryStore::new()));
        let state = ViewState {
            start_input: date::day_key(clock.today()).to_string(),
            ..ViewState::default()
        };
        ScheduleEngine {
            store: PlanStore::new(backend),
            clock,
            state,
        }
    }
}

impl Default for ScheduleEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleEngine {
    pub fn builder() -> ScheduleEngineBuilder {
        ScheduleEngineBuilder::new()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn store(&self) -> &PlanStore {
        &self.store
    }

    pub fn set_start_input(&mut self, input: impl Into<String>) {
        self.state.start_input = input.into();
    }

    /// Startup entry point: redisplays the persisted plan, if there is one.
    ///
    /// A schedule still on display when the plan has gone is taken down.
    #[instrument(skip(self, surface))]
    pub fn initialize(&mut self, surface: &mut dyn DisplaySurface) {
        self.state.start_input = self.today_key();
        match self.store.load() {
            Some(plan) => {
                debug!(start = %plan.start_date, "restoring persisted plan");
                self.state.start_input = plan.start_date.to_string();
                self.generate(surface);
            }
            None => {
                debug!("no persisted plan");
                if self.state.view.take().is_some() {
                    surface.reset();
                    self.notify(surface, Notice::success("Data cleared."));
                }
            }
        }
    }

    /// Builds the checklist from the start-date input, persists it and renders it.
    #[instrument(skip(self, surface))]
    pub fn generate(&mut self, surface: &mut dyn DisplaySurface) {
        let today = self.clock.today();
        debug!(start = %self.state.start_input, %today, "generating");
        let schedule = match schedule::generate(&self.state.start_input, today) {
            Ok(schedule) => schedule,
            Err(err) => {
                self.report(surface, &err);
                return;
            }
        };
        self.state.last_notice = None;

        let saved = self.store.save(&schedule.plan);
        let view = ScheduleView {
            progress: progress::evaluate(&schedule.plan.days),
            rows: schedule.rows,
            start_date: schedule.start_date,
            end_date: schedule.end_date,
        };
        surface.render(&view);
        info!(
            completed = view.progress.completed_count,
            tier = ?view.progress.tier,
            "schedule displayed"
        );
        self.state.view = Some(view);

        match saved {
            Ok(()) => self.notify(surface, Notice::success("Plan updated.")),
            Err(err) => self.report(surface, &err),
        }
    }

    /// Sets the start-date input and generates from it.
    pub fn generate_from(&mut self, surface: &mut dyn DisplaySurface, start_input: &str) {
        self.set_start_input(start_input);
        self.generate(surface);
    }

    /// Deletes the persisted plan after the surface confirms.
    #[instrument(skip(self, surface))]
    pub fn clear(&mut self, surface: &mut dyn DisplaySurface) {
        if !surface.confirm(CLEAR_PROMPT) {
            debug!("clear declined");
            return;
        }
        if let Err(err) = self.store.clear() {
            self.report(surface, &err);
            return;
        }
        self.state = ViewState {
            start_input: self.today_key(),
            ..ViewState::default()
        };
        surface.reset();
        self.notify(surface, Notice::success("Data cleared."));
    }

    /// Backup bytes of the persisted plan, ready to be written to
    /// [`BACKUP_FILE_NAME`](crate::transfer::BACKUP_FILE_NAME).
    #[instrument(skip(self, surface))]
    pub fn export(&mut self, surface: &mut dyn DisplaySurface) -> Option<Vec<u8>> {
        match transfer::export(&self.store) {
            Ok(bytes) => {
                self.notify(surface, Notice::success("Backup saved!"));
                Some(bytes)
            }
            Err(err) => {
                self.report(surface, &err);
                None
            }
        }
    }

    /// Replaces the persisted plan with a backup and redisplays it through
    /// the startup path.
    ///
    /// Redisplay regenerates from the backup's start date, so completion flags
    /// follow the default rule rather than the flags inside the backup.
    #[instrument(skip(self, surface, bytes), fields(len = bytes.len()))]
    pub fn import(&mut self, surface: &mut dyn DisplaySurface, bytes: &[u8]) {
        let plan = match transfer::import(bytes) {
            Ok(plan) => plan,
            Err(err) => {
                self.report(surface, &err);
                return;
            }
        };
        if let Err(err) = self.store.save(&plan) {
            self.report(surface, &err);
            return;
        }
        self.state.last_notice = None;
        self.initialize(surface);
        if let Some(Notice {
            severity: Severity::Error,
            ..
        }) = self.state.last_notice
        {
            debug!("restored plan could not be redisplayed");
            return;
        }
        self.notify(surface, Notice::success("Restored!"));
    }

    #[instrument(skip(self, surface))]
    pub fn print(&mut self, surface: &mut dyn DisplaySurface) {
        if let Some(view) = &self.state.view {
            surface.print(view);
            return;
        }
        self.notify(surface, Notice::error("Nothing to print yet."));
    }

    fn today_key(&self) -> String {
        date::day_key(self.clock.today()).to_string()
    }

    fn report(&mut self, surface: &mut dyn DisplaySurface, err: &PlanError) {
        warn!(%err, "action failed");
        self.notify(surface, notice_for(err));
    }

    fn notify(&mut self, surface: &mut dyn DisplaySurface, notice: Notice) {
        surface.notify(&notice);
        self.state.last_notice = Some(notice);
    }
}

fn notice_for(err: &PlanError) -> Notice {
    let text = match err {
        PlanError::InvalidInput => "Select a start date.",
        PlanError::InvalidDate(_) => "Invalid date, use YYYY-MM-DD.",
        PlanError::StorageWriteFailure(_) => "Failed to save.",
        PlanError::StorageReadCorrupt(_) | PlanError::NoData => "No data.",
        PlanError::InvalidFormat(_) => "Invalid file.",
    };
    Notice::error(text)
}
