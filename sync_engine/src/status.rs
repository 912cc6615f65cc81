use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

/// Observability snapshot of the sync loop.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncStatus {
    pub last_attempted_update: Option<DateTime<Utc>>,
    pub last_successful_update: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub cycles_applied: u64,
    pub cycles_failed: u64,
    pub cycles_stale: u64,
    pub ticks_skipped: u64,
    pub facilities_dropped: u64,
    pub rendered_markers: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SharedStatus(Arc<RwLock<SyncStatus>>);

impl SharedStatus {
    pub fn snapshot(&self) -> SyncStatus {
        self.0.read().clone()
    }

    pub(crate) fn update(&self, f: impl FnOnce(&mut SyncStatus)) {
        f(&mut self.0.write());
    }
}
