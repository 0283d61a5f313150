use serde::{Deserialize, Serialize};

fn unknown() -> String {
    "Unknown".to_string()
}

/// One reported resource state from an agent. Defaulting happens once here
/// at decode time: a report missing any field still produces a fully
/// populated snapshot, so downstream code never re-derives defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    #[serde(default = "unknown")]
    pub hostname: String,
    #[serde(default)]
    pub ip_address: String,
    #[serde(default)]
    pub cpu: CpuInfo,
    #[serde(default)]
    pub memory: MemoryInfo,
    #[serde(default)]
    pub storage: StorageInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpuInfo {
    #[serde(default = "unknown")]
    pub model: String,
    #[serde(default)]
    pub cores: u32,
    #[serde(default)]
    pub usage_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryInfo {
    #[serde(default = "unknown")]
    pub total: String,
    #[serde(default = "unknown")]
    pub available: String,
    #[serde(default)]
    pub usage_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageInfo {
    #[serde(default = "unknown")]
    pub total: String,
    #[serde(default = "unknown")]
    pub free: String,
    #[serde(default)]
    pub usage_percent: f64,
}

impl Default for ResourceSnapshot {
    fn default() -> Self {
        Self {
            hostname: unknown(),
            ip_address: String::new(),
            cpu: CpuInfo::default(),
            memory: MemoryInfo::default(),
            storage: StorageInfo::default(),
        }
    }
}

impl Default for CpuInfo {
    fn default() -> Self {
        Self {
            model: unknown(),
            cores: 0,
            usage_percent: 0.0,
        }
    }
}

impl Default for MemoryInfo {
    fn default() -> Self {
        Self {
            total: unknown(),
            available: unknown(),
            usage_percent: 0.0,
        }
    }
}

impl Default for StorageInfo {
    fn default() -> Self {
        Self {
            total: unknown(),
            free: unknown(),
            usage_percent: 0.0,
        }
    }
}
