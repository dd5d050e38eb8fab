use std::io;

use thiserror::Error;

/// Failures raised by a [`KeyValueStore`](crate::store::KeyValueStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("storage quota exceeded ({needed} bytes needed, {quota} allowed)")]
    QuotaExceeded { needed: usize, quota: usize },
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("no start date selected")]
    InvalidInput,
    #[error("`{0}` is not a YYYY-MM-DD calendar date")]
    InvalidDate(String),
    #[error("failed to save plan")]
    StorageWriteFailure(#[source] StoreError),
    #[error("persisted plan is unreadable: {0}")]
    StorageReadCorrupt(String),
    #[error("no saved plan")]
    NoData,
    #[error("invalid backup file: {0}")]
    InvalidFormat(String),
}

pub type Result<T, E = PlanError> = std::result::Result<T, E>;
