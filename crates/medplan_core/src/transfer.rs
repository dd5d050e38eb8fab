//! Backup files: the persisted plan written out verbatim, and read back in.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::debug;

use crate::date::DayKey;
use crate::error::{PlanError, Result};
use crate::plan::Plan;
use crate::store::PlanStore;

/// File name offered for downloaded backups.
pub const BACKUP_FILE_NAME: &str = "medicacao_backup.json";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BackupFile {
    start_date: Option<String>,
    days: Option<BTreeMap<DayKey, bool>>,
}

/// Serializes the persisted plan in its storage shape.
pub fn export(store: &PlanStore) -> Result<Vec<u8>> {
    let plan = store.load().ok_or(PlanError::NoData)?;
    to_bytes(&plan)
}

pub fn to_bytes(plan: &Plan) -> Result<Vec<u8>> {
    serde_json::to_vec(plan).map_err(|err| PlanError::InvalidFormat(err.to_string()))
}

/// Parses a backup. Both `startDate` and `days` must be present and
/// well-formed; nothing is written here.
pub fn import(bytes: &[u8]) -> Result<Plan> {
    let backup: BackupFile =
        serde_json::from_slice(bytes).map_err(|err| PlanError::InvalidFormat(err.to_string()))?;

    let start_date = match backup.start_date.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => DayKey::parse(raw)
            .map_err(|_| PlanError::InvalidFormat(format!("`startDate` is not a date: {raw}")))?,
        _ => return Err(PlanError::InvalidFormat("missing `startDate`".into())),
    };
    let days = backup
        .days
        .ok_or_else(|| PlanError::InvalidFormat("missing `days`".into()))?;

    debug!(start = %start_date, entries = days.len(), "parsed backup");
    Ok(Plan { start_date, days })
}
