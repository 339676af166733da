// Point-in-time host snapshot (one per sampling tick)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{CpuStats, DiskStats, HostStats, MemoryStats, NetworkStats, ProcessStat};

/// Top-level snapshot section; listed in `Snapshot::failed` when its collection failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Host,
    Cpu,
    Memory,
    Disk,
    Network,
    Processes,
    Services,
}

impl Section {
    pub const ALL: [Section; 7] = [
        Section::Host,
        Section::Cpu,
        Section::Memory,
        Section::Disk,
        Section::Network,
        Section::Processes,
        Section::Services,
    ];
}

/// Complete view of the host at one tick. Failed sections hold their placeholder
/// value and are named in `failed`; no key is ever omitted from the wire form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Assigned by the sampler; strictly increasing across ticks.
    pub generation: u64,
    /// Unix millis.
    pub timestamp: u64,
    /// Local time, "%Y-%m-%d %H:%M:%S".
    pub current_time: String,
    pub host: HostStats,
    pub cpu: CpuStats,
    pub memory: MemoryStats,
    pub disk: DiskStats,
    pub network: NetworkStats,
    pub processes: Vec<ProcessStat>,
    /// Display name -> active.
    pub services: BTreeMap<String, bool>,
    #[serde(default)]
    pub failed: Vec<Section>,
}

impl Snapshot {
    /// Fully degraded snapshot: every section is a placeholder and tagged as failed.
    pub fn placeholder(generation: u64) -> Self {
        Self {
            generation,
            timestamp: 0,
            current_time: String::new(),
            host: HostStats::placeholder(),
            cpu: CpuStats::placeholder(),
            memory: MemoryStats::placeholder(),
            disk: DiskStats::placeholder(),
            network: NetworkStats::placeholder(),
            processes: vec![],
            services: BTreeMap::new(),
            failed: Section::ALL.to_vec(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Tag a section as failed (idempotent).
    pub fn mark_failed(&mut self, section: Section) {
        if !self.failed.contains(&section) {
            self.failed.push(section);
        }
    }
}
