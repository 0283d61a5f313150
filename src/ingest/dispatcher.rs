use chrono::Utc;
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::IngestError;
use crate::registry::StatusStore;
use crate::transport::TransportMessage;
use crate::types::{LivenessState, ResourceSnapshot};

/// Wire form of a full resource report. The agent id travels inside the
/// payload because the general report topic is a wildcard subscription.
#[derive(Debug, Deserialize)]
struct FullReport {
    #[serde(default)]
    machine_id: Option<String>,
    #[serde(flatten)]
    snapshot: ResourceSnapshot,
    #[serde(default)]
    online_status: Option<String>,
}

/// Wire form of a status-only correction; the agent id is topic-encoded.
#[derive(Debug, Deserialize)]
struct StatusPayload {
    #[serde(default)]
    status: String,
}

pub struct IngestDispatcher<S: StatusStore> {
    store: Arc<S>,
    namespace: String,
    decode_errors: AtomicU64,
}

impl<S: StatusStore> IngestDispatcher<S> {
    pub fn new(store: Arc<S>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            decode_errors: AtomicU64::new(0),
        }
    }

    /// Classify one transport message and apply the corresponding registry
    /// mutation: exactly one mutation per successfully decoded message,
    /// zero on failure. Decode failures are counted and the message is
    /// dropped.
    pub fn dispatch(&self, msg: &TransportMessage) -> Result<(), IngestError> {
        let outcome = self.apply(msg);
        if let Err(err) = &outcome {
            if err.is_decode() {
                self.decode_errors.fetch_add(1, Ordering::Relaxed);
            }
        }
        outcome
    }

    pub fn decode_error_count(&self) -> u64 {
        self.decode_errors.load(Ordering::Relaxed)
    }

    fn apply(&self, msg: &TransportMessage) -> Result<(), IngestError> {
        if let Some(agent_id) = self.status_topic_agent(&msg.topic) {
            let payload: StatusPayload = serde_json::from_slice(&msg.payload)?;
            let liveness = LivenessState::parse(&payload.status)
                .ok_or_else(|| IngestError::InvalidStatus(payload.status.clone()))?;
            // A correction for an agent that has never reported carries no
            // actionable information; the store ignores it silently.
            self.store.update_status(agent_id, liveness)?;
            return Ok(());
        }

        let report: FullReport = serde_json::from_slice(&msg.payload)?;
        let machine_id = report
            .machine_id
            .filter(|id| !id.is_empty())
            .ok_or(IngestError::MissingMachineId)?;
        let liveness = report
            .online_status
            .as_deref()
            .map(LivenessState::from_report)
            .unwrap_or(LivenessState::Online);
        self.store
            .upsert_snapshot(&machine_id, report.snapshot, liveness, Utc::now())?;
        Ok(())
    }

    /// `<namespace>/<agent-id>/status` carries a bare status correction.
    fn status_topic_agent<'a>(&self, topic: &'a str) -> Option<&'a str> {
        let parts: Vec<&str> = topic.split('/').collect();
        if parts.len() >= 3 && parts[0] == self.namespace && parts[2] == "status" {
            Some(parts[1])
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::InMemoryRegistry;

    const NS: &str = "machine_status";

    fn dispatcher() -> (IngestDispatcher<InMemoryRegistry>, Arc<InMemoryRegistry>) {
        let store = Arc::new(InMemoryRegistry::new());
        (IngestDispatcher::new(store.clone(), NS), store)
    }

    fn report_msg(topic: &str, body: &str) -> TransportMessage {
        TransportMessage::new(topic, body.as_bytes().to_vec())
    }

    #[test]
    fn test_full_report_creates_online_record() {
        let (dispatcher, store) = dispatcher();
        let msg = report_msg(
            "machine_status/m-1",
            r#"{"machine_id":"m-1","hostname":"web-01","cpu":{"usage_percent":12.5}}"#,
        );

        dispatcher.dispatch(&msg).unwrap();

        let record = store.get("m-1").unwrap().unwrap();
        assert_eq!(record.liveness, LivenessState::Online);
        assert_eq!(record.snapshot.hostname, "web-01");
        assert_eq!(record.snapshot.cpu.usage_percent, 12.5);
        assert_eq!(record.snapshot.memory.total, "Unknown");
    }

    #[test]
    fn test_report_with_offline_status_is_stored_offline() {
        let (dispatcher, store) = dispatcher();
        let msg = report_msg(
            "machine_status/m-1",
            r#"{"machine_id":"m-1","online_status":"offline"}"#,
        );

        dispatcher.dispatch(&msg).unwrap();
        let record = store.get("m-1").unwrap().unwrap();
        assert_eq!(record.liveness, LivenessState::Offline);
    }

    #[test]
    fn test_status_topic_updates_existing_record() {
        let (dispatcher, store) = dispatcher();
        dispatcher
            .dispatch(&report_msg(
                "machine_status/m-1",
                r#"{"machine_id":"m-1","hostname":"web-01"}"#,
            ))
            .unwrap();

        dispatcher
            .dispatch(&report_msg(
                "machine_status/m-1/status",
                r#"{"status":"offline"}"#,
            ))
            .unwrap();

        let record = store.get("m-1").unwrap().unwrap();
        assert_eq!(record.liveness, LivenessState::Offline);
        // status-only path leaves the snapshot alone
        assert_eq!(record.snapshot.hostname, "web-01");
    }

    #[test]
    fn test_status_for_unseen_agent_creates_no_record() {
        let (dispatcher, store) = dispatcher();

        dispatcher
            .dispatch(&report_msg(
                "machine_status/ghost/status",
                r#"{"status":"online"}"#,
            ))
            .unwrap();

        assert!(store.get("ghost").unwrap().is_none());
        assert!(store.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_json_counts_and_mutates_nothing() {
        let (dispatcher, store) = dispatcher();

        let err = dispatcher
            .dispatch(&report_msg("machine_status/m-1", "{not json"))
            .unwrap_err();

        assert!(matches!(err, IngestError::Payload(_)));
        assert_eq!(dispatcher.decode_error_count(), 1);
        assert!(store.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_missing_machine_id_is_a_decode_failure() {
        let (dispatcher, store) = dispatcher();

        let err = dispatcher
            .dispatch(&report_msg("machine_status/m-1", r#"{"hostname":"web-01"}"#))
            .unwrap_err();
        assert!(matches!(err, IngestError::MissingMachineId));

        let err = dispatcher
            .dispatch(&report_msg(
                "machine_status/m-1",
                r#"{"machine_id":"","hostname":"web-01"}"#,
            ))
            .unwrap_err();
        assert!(matches!(err, IngestError::MissingMachineId));

        assert_eq!(dispatcher.decode_error_count(), 2);
        assert!(store.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_unrecognized_status_value_is_rejected() {
        let (dispatcher, store) = dispatcher();
        dispatcher
            .dispatch(&report_msg("machine_status/m-1", r#"{"machine_id":"m-1"}"#))
            .unwrap();

        let err = dispatcher
            .dispatch(&report_msg(
                "machine_status/m-1/status",
                r#"{"status":"rebooting"}"#,
            ))
            .unwrap_err();

        assert!(matches!(err, IngestError::InvalidStatus(_)));
        assert_eq!(dispatcher.decode_error_count(), 1);
        let record = store.get("m-1").unwrap().unwrap();
        assert_eq!(record.liveness, LivenessState::Online);
    }

    #[test]
    fn test_new_report_resurrects_offline_agent() {
        let (dispatcher, store) = dispatcher();
        dispatcher
            .dispatch(&report_msg("machine_status/m-1", r#"{"machine_id":"m-1"}"#))
            .unwrap();
        store.update_status("m-1", LivenessState::Offline).unwrap();
        let stale = store.get("m-1").unwrap().unwrap();

        dispatcher
            .dispatch(&report_msg("machine_status/m-1", r#"{"machine_id":"m-1"}"#))
            .unwrap();

        let record = store.get("m-1").unwrap().unwrap();
        assert_eq!(record.liveness, LivenessState::Online);
        assert!(record.last_seen >= stale.last_seen);
    }

    #[test]
    fn test_foreign_namespace_status_topic_is_not_a_correction() {
        let (dispatcher, store) = dispatcher();
        dispatcher
            .dispatch(&report_msg("machine_status/m-1", r#"{"machine_id":"m-1"}"#))
            .unwrap();

        // wrong namespace: classified as a general report, which then
        // fails decode for want of a machine_id
        let err = dispatcher
            .dispatch(&report_msg("other_ns/m-1/status", r#"{"status":"offline"}"#))
            .unwrap_err();

        assert!(matches!(err, IngestError::MissingMachineId));
        assert_eq!(
            store.get("m-1").unwrap().unwrap().liveness,
            LivenessState::Online
        );
    }
}
