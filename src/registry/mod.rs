pub mod memory;

pub use memory::InMemoryRegistry;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::types::{AgentRecord, LivenessState, ResourceSnapshot};

/// Concurrency-safe mapping from agent id to its current aggregate record.
///
/// Every operation is atomic with respect to every other operation, but
/// there is no cross-operation transaction: a `get_all` snapshot may be
/// stale by the time it is consumed. Reads hand out clones, never
/// references into the store.
pub trait StatusStore: Send + Sync {
    /// Create the record on first contact, or replace the snapshot,
    /// liveness and last-seen time of an existing one.
    fn upsert_snapshot(
        &self,
        id: &str,
        snapshot: ResourceSnapshot,
        liveness: LivenessState,
        seen_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Mutate liveness only. Does not touch the snapshot or last-seen
    /// time, and is a silent no-op for ids the store has never seen.
    fn update_status(&self, id: &str, liveness: LivenessState) -> Result<()>;

    fn get(&self, id: &str) -> Result<Option<AgentRecord>>;

    /// Point-in-time copy of every record. Ordering is unspecified here;
    /// deterministic ordering is the reader's concern.
    fn get_all(&self) -> Result<Vec<AgentRecord>>;
}
