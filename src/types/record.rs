use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AgentId, LivenessState, ResourceSnapshot};

/// The unit stored per agent: latest snapshot plus liveness metadata.
/// Owned exclusively by the registry; everything handed outward is a clone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: AgentId,
    pub snapshot: ResourceSnapshot,
    pub liveness: LivenessState,
    pub last_seen: DateTime<Utc>,
}

impl AgentRecord {
    pub fn new(
        id: AgentId,
        snapshot: ResourceSnapshot,
        liveness: LivenessState,
        seen_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            snapshot,
            liveness,
            last_seen: seen_at,
        }
    }

    /// Whole seconds elapsed since the last report, truncated.
    pub fn seconds_since_seen(&self, now: DateTime<Utc>) -> i64 {
        now.signed_duration_since(self.last_seen).num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_seconds_since_seen_truncates() {
        let seen = Utc::now();
        let record = AgentRecord::new(
            "m-1".to_string(),
            ResourceSnapshot::default(),
            LivenessState::Online,
            seen,
        );

        let now = seen + Duration::milliseconds(60_900);
        assert_eq!(record.seconds_since_seen(now), 60);
    }
}
