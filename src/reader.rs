use anyhow::Result;
use std::sync::Arc;

use crate::registry::StatusStore;
use crate::types::AgentRecord;

/// Read-only view over the registry for reporters, exporters and query
/// layers. Hands out copies only; no mutation capability is exposed.
pub struct SnapshotReader<S: StatusStore> {
    store: Arc<S>,
}

impl<S: StatusStore> SnapshotReader<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Every record, ordered by hostname then agent id so repeated reads
    /// diff cleanly.
    pub fn read_all(&self) -> Result<Vec<AgentRecord>> {
        let mut records = self.store.get_all()?;
        records.sort_by(|a, b| {
            a.snapshot
                .hostname
                .cmp(&b.snapshot.hostname)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(records)
    }

    pub fn read_one(&self, id: &str) -> Result<Option<AgentRecord>> {
        self.store.get(id)
    }
}
