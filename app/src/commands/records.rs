//! Record set commands
use serde::Serialize;

use super::{CommandResult, RecordInfo};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RecordList {
    pub total: usize,
    pub records: Vec<RecordInfo>,
}

pub async fn initialize(state: &AppState) -> CommandResult<zipdb_core::DirectoryStats> {
    let directory = state.directory();
    let result = match directory.initialize().await {
        Ok(()) => directory.stats().await,
        Err(e) => Err(e),
    };
    result.into()
}

pub async fn reload(state: &AppState) -> CommandResult<usize> {
    state.directory().reload().await.into()
}

pub async fn list_records(state: &AppState, limit: Option<usize>) -> CommandResult<RecordList> {
    state
        .directory()
        .all_records()
        .await
        .map(|records| {
            let total = records.len();
            RecordList {
                total,
                records: records
                    .into_iter()
                    .take(limit.unwrap_or(total))
                    .map(RecordInfo::from)
                    .collect(),
            }
        })
        .into()
}

pub async fn random_record(state: &AppState) -> CommandResult<Option<RecordInfo>> {
    state
        .directory()
        .random_record()
        .await
        .map(|record| record.map(RecordInfo::from))
        .into()
}

pub async fn stats(state: &AppState) -> CommandResult<zipdb_core::DirectoryStats> {
    state.directory().stats().await.into()
}
