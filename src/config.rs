use serde::{Deserialize, Serialize};

pub const DEFAULT_OFFLINE_THRESHOLD_SECS: u64 = 60;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_TOPIC_NAMESPACE: &str = "machine_status";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub offline_threshold_secs: u64,
    pub sweep_interval_secs: u64,
    pub topic_namespace: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            offline_threshold_secs: DEFAULT_OFFLINE_THRESHOLD_SECS,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            topic_namespace: DEFAULT_TOPIC_NAMESPACE.to_string(),
        }
    }
}

impl Config {
    /// Environment overrides; zero or unparsable interval values fall back
    /// to the defaults (both must stay > 0).
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            offline_threshold_secs: env_secs(
                "VIGIL_OFFLINE_THRESHOLD_SECS",
                defaults.offline_threshold_secs,
            ),
            sweep_interval_secs: env_secs(
                "VIGIL_SWEEP_INTERVAL_SECS",
                defaults.sweep_interval_secs,
            ),
            topic_namespace: std::env::var("VIGIL_TOPIC_NAMESPACE")
                .unwrap_or(defaults.topic_namespace),
        }
    }
}

fn env_secs(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .filter(|&secs| secs > 0)
        .unwrap_or(default)
}
