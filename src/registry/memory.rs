use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::registry::StatusStore;
use crate::types::{AgentId, AgentRecord, LivenessState, ResourceSnapshot};

#[derive(Clone, Default)]
pub struct InMemoryRegistry {
    records: Arc<RwLock<HashMap<AgentId, AgentRecord>>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl StatusStore for InMemoryRegistry {
    fn upsert_snapshot(
        &self,
        id: &str,
        snapshot: ResourceSnapshot,
        liveness: LivenessState,
        seen_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut records = self.records.write().unwrap();
        match records.get_mut(id) {
            Some(record) => {
                record.snapshot = snapshot;
                record.liveness = liveness;
                record.last_seen = seen_at;
            }
            None => {
                records.insert(
                    id.to_string(),
                    AgentRecord::new(id.to_string(), snapshot, liveness, seen_at),
                );
            }
        }
        Ok(())
    }

    fn update_status(&self, id: &str, liveness: LivenessState) -> Result<()> {
        let mut records = self.records.write().unwrap();
        if let Some(record) = records.get_mut(id) {
            record.liveness = liveness;
        }
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<AgentRecord>> {
        let records = self.records.read().unwrap();
        Ok(records.get(id).cloned())
    }

    fn get_all(&self) -> Result<Vec<AgentRecord>> {
        let records = self.records.read().unwrap();
        Ok(records.values().cloned().collect())
    }
}
