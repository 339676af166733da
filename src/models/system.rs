// Host identity, CPU, memory and disk sections

use serde::{Deserialize, Serialize};

/// Text shown wherever a metric could not be collected.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostStats {
    pub hostname: String,
    /// Human-readable, e.g. "26h 3m 12s".
    pub uptime: String,
    pub os_release: String,
    pub kernel_version: String,
    pub logged_in_users: u32,
}

impl HostStats {
    pub fn placeholder() -> Self {
        Self {
            hostname: NOT_AVAILABLE.into(),
            uptime: NOT_AVAILABLE.into(),
            os_release: NOT_AVAILABLE.into(),
            kernel_version: NOT_AVAILABLE.into(),
            logged_in_users: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuStats {
    pub model: String,
    /// Formatted, e.g. "3400.00 MHz".
    pub frequency: String,
    /// Formatted, e.g. "1 min: 0.52, 5 min: 0.61, 15 min: 0.70".
    pub load_avg: String,
    pub utilization_percent: f64,
    /// Index is the core id.
    pub per_core_percent: Vec<f64>,
}

impl CpuStats {
    pub fn placeholder() -> Self {
        Self {
            model: NOT_AVAILABLE.into(),
            frequency: NOT_AVAILABLE.into(),
            load_avg: NOT_AVAILABLE.into(),
            utilization_percent: 0.0,
            per_core_percent: vec![],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStats {
    pub total_gb: f64,
    pub available_gb: f64,
    pub used_gb: f64,
    pub utilization_percent: f64,
    pub swap_utilization_percent: f64,
}

impl MemoryStats {
    pub fn placeholder() -> Self {
        Self {
            total_gb: 0.0,
            available_gb: 0.0,
            used_gb: 0.0,
            utilization_percent: 0.0,
            swap_utilization_percent: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskStats {
    /// Usage of the root filesystem.
    pub utilization_percent: f64,
    /// Total bytes read since boot, formatted ("12.40 GB").
    pub read: String,
    /// Total bytes written since boot, formatted.
    pub write: String,
}

impl DiskStats {
    pub fn placeholder() -> Self {
        Self {
            utilization_percent: 0.0,
            read: NOT_AVAILABLE.into(),
            write: NOT_AVAILABLE.into(),
        }
    }
}
