pub mod record;
pub mod snapshot;

pub use record::AgentRecord;
pub use snapshot::{CpuInfo, MemoryInfo, ResourceSnapshot, StorageInfo};

use serde::{Deserialize, Serialize};

pub type AgentId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LivenessState {
    Online,
    Offline,
    Unknown,
}

impl LivenessState {
    pub fn as_str(&self) -> &str {
        match self {
            LivenessState::Online => "online",
            LivenessState::Offline => "offline",
            LivenessState::Unknown => "unknown",
        }
    }

    /// Mapping for the `online_status` field of a full report: anything
    /// that is not explicitly "offline" counts as online.
    pub fn from_report(value: &str) -> Self {
        if value.eq_ignore_ascii_case("offline") {
            LivenessState::Offline
        } else {
            LivenessState::Online
        }
    }

    /// Strict mapping for status-only corrections. Unrecognized values are
    /// rejected by the dispatcher rather than stored.
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("online") {
            Some(LivenessState::Online)
        } else if value.eq_ignore_ascii_case("offline") {
            Some(LivenessState::Offline)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_report_defaults_to_online() {
        assert_eq!(LivenessState::from_report("online"), LivenessState::Online);
        assert_eq!(LivenessState::from_report("OFFLINE"), LivenessState::Offline);
        assert_eq!(LivenessState::from_report("degraded"), LivenessState::Online);
    }

    #[test]
    fn test_parse_rejects_unrecognized() {
        assert_eq!(LivenessState::parse("online"), Some(LivenessState::Online));
        assert_eq!(LivenessState::parse("Offline"), Some(LivenessState::Offline));
        assert_eq!(LivenessState::parse("rebooting"), None);
        assert_eq!(LivenessState::parse(""), None);
    }
}
