pub mod clock;
pub mod date;
pub mod display;
pub mod engine;
pub mod error;
pub mod plan;
pub mod progress;
pub mod regimen;
pub mod schedule;
pub mod store;
pub mod transfer;

pub use crate::engine::{ScheduleEngine, ScheduleEngineBuilder};
pub use crate::error::{PlanError, StoreError};
