// Host metric collection via sysinfo, /proc and systemctl

mod command;
pub mod format;
mod linux;

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use sysinfo::{Disks, Networks, ProcessesToUpdate, System};
use tokio::time::Duration;
use tracing::instrument;

use crate::error::CollectionError;
use crate::models::*;

/// Bound on each subprocess (systemctl, who).
const COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// Produces one snapshot per call. Sections that fail are expected to carry
/// their placeholder and be listed in `Snapshot::failed`; an `Err` means
/// nothing usable was produced.
pub trait MetricCollector: Send + Sync + 'static {
    fn collect(&self) -> impl Future<Output = Result<Snapshot, CollectionError>> + Send;
}

/// Facts that do not change while the process runs; read once at startup.
#[derive(Debug, Clone)]
struct HostIdentity {
    hostname: String,
    os_release: String,
    kernel_version: String,
    cpu_model: String,
}

struct NetTotals {
    sent: u64,
    received: u64,
    at: Instant,
}

pub struct SysinfoCollector {
    sys: Arc<Mutex<System>>,
    disks: Arc<Mutex<Disks>>,
    networks: Arc<Mutex<Networks>>,
    last_net_totals: Arc<Mutex<Option<NetTotals>>>,
    identity: HostIdentity,
    services: BTreeMap<String, String>,
}

impl SysinfoCollector {
    /// `services` maps systemd unit -> display name.
    pub fn new(services: BTreeMap<String, String>) -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();
        let cpu_model = linux::read_cpu_model_linux()
            .or_else(|| {
                sys.cpus()
                    .first()
                    .map(|c| c.brand().trim().to_string())
                    .filter(|s| !s.is_empty())
            })
            .unwrap_or_else(|| NOT_AVAILABLE.into());
        let identity = HostIdentity {
            hostname: System::host_name().unwrap_or_else(|| NOT_AVAILABLE.into()),
            os_release: linux::read_os_pretty_name_linux()
                .or_else(System::long_os_version)
                .unwrap_or_else(|| std::env::consts::OS.into()),
            kernel_version: System::kernel_version().unwrap_or_else(|| NOT_AVAILABLE.into()),
            cpu_model,
        };
        tracing::debug!(?identity, "host identity");
        Self {
            sys: Arc::new(Mutex::new(sys)),
            disks: Arc::new(Mutex::new(Disks::new_with_refreshed_list())),
            networks: Arc::new(Mutex::new(Networks::new_with_refreshed_list())),
            last_net_totals: Arc::new(Mutex::new(None)),
            identity,
            services,
        }
    }

    #[instrument(skip(self), fields(collector = "sysinfo", operation = "host_stats"))]
    pub async fn host_stats(&self) -> Result<HostStats, CollectionError> {
        let logged_in_users = match command::count_logged_in_users(COMMAND_TIMEOUT).await {
            Ok(n) => n,
            Err(e) => {
                tracing::debug!(error = %e, "who failed; reporting 0 users");
                0
            }
        };
        Ok(HostStats {
            hostname: self.identity.hostname.clone(),
            uptime: format::format_uptime(System::uptime()),
            os_release: self.identity.os_release.clone(),
            kernel_version: self.identity.kernel_version.clone(),
            logged_in_users,
        })
    }

    #[instrument(skip(self), fields(collector = "sysinfo", operation = "cpu_stats"))]
    pub async fn cpu_stats(&self) -> Result<CpuStats, CollectionError> {
        let sys = self.sys.clone();
        let model = self.identity.cpu_model.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = sys
                .lock()
                .map_err(|_| CollectionError::LockPoisoned("sysinfo"))?;
            // Usage is measured since the previous refresh, i.e. over one sampling interval.
            sys.refresh_cpu_all();
            let per_core_percent: Vec<f64> = sys
                .cpus()
                .iter()
                .map(|c| (c.cpu_usage() as f64).clamp(0.0, 100.0))
                .collect();
            let frequency = sys
                .cpus()
                .first()
                .map(|c| format!("{:.2} MHz", c.frequency() as f64))
                .unwrap_or_else(|| NOT_AVAILABLE.into());
            let load = System::load_average();
            Ok(CpuStats {
                model,
                frequency,
                load_avg: format::format_load_avg(load.one, load.five, load.fifteen),
                utilization_percent: (sys.global_cpu_usage() as f64).clamp(0.0, 100.0),
                per_core_percent,
            })
        })
        .await?
    }

    #[instrument(skip(self), fields(collector = "sysinfo", operation = "memory_stats"))]
    pub async fn memory_stats(&self) -> Result<MemoryStats, CollectionError> {
        let sys = self.sys.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = sys
                .lock()
                .map_err(|_| CollectionError::LockPoisoned("sysinfo"))?;
            sys.refresh_memory();
            let total = sys.total_memory();
            let available = sys.available_memory();
            let used = total.saturating_sub(available);
            Ok(MemoryStats {
                total_gb: format::bytes_to_gb(total),
                available_gb: format::bytes_to_gb(available),
                used_gb: format::bytes_to_gb(used),
                utilization_percent: format::percent_of(used, total),
                swap_utilization_percent: format::percent_of(sys.used_swap(), sys.total_swap()),
            })
        })
        .await?
    }

    #[instrument(skip(self), fields(collector = "sysinfo", operation = "disk_stats"))]
    pub async fn disk_stats(&self) -> Result<DiskStats, CollectionError> {
        let disks = self.disks.clone();
        tokio::task::spawn_blocking(move || {
            let mut disks = disks
                .lock()
                .map_err(|_| CollectionError::LockPoisoned("sysinfo disks"))?;
            disks.refresh(true);
            let root = disks
                .list()
                .iter()
                .find(|d| d.mount_point() == std::path::Path::new("/"))
                .or_else(|| disks.list().iter().max_by_key(|d| d.total_space()))
                .ok_or_else(|| CollectionError::unavailable("disks", "no mounted filesystem"))?;
            let total = root.total_space();
            let used = total.saturating_sub(root.available_space());
            let (read, write) = match linux::read_disk_io_totals() {
                Some((r, w)) => (format::format_bytes(r as f64), format::format_bytes(w as f64)),
                None => (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string()),
            };
            Ok(DiskStats {
                utilization_percent: format::percent_of(used, total),
                read,
                write,
            })
        })
        .await?
    }

    /// Throughput since the previous call; the first call reports zero.
    #[instrument(skip(self), fields(collector = "sysinfo", operation = "network_rates"))]
    pub async fn network_rates(&self) -> Result<(NetworkUtilization, String), CollectionError> {
        let networks = self.networks.clone();
        let last = self.last_net_totals.clone();
        tokio::task::spawn_blocking(move || {
            let mut networks = networks
                .lock()
                .map_err(|_| CollectionError::LockPoisoned("sysinfo networks"))?;
            networks.refresh(true);
            let (sent, received) = networks.list().values().fold((0u64, 0u64), |acc, data| {
                (
                    acc.0.saturating_add(data.total_transmitted()),
                    acc.1.saturating_add(data.total_received()),
                )
            });
            let now = Instant::now();
            let mut last = last
                .lock()
                .map_err(|_| CollectionError::LockPoisoned("network totals"))?;
            let (up_bps, down_bps) = match last.as_ref() {
                Some(prev) => {
                    let dt = now.duration_since(prev.at).as_secs_f64();
                    if dt > 0.0 {
                        (
                            sent.saturating_sub(prev.sent) as f64 / dt,
                            received.saturating_sub(prev.received) as f64 / dt,
                        )
                    } else {
                        (0.0, 0.0)
                    }
                }
                None => (0.0, 0.0),
            };
            *last = Some(NetTotals {
                sent,
                received,
                at: now,
            });
            Ok((
                NetworkUtilization {
                    upload: up_bps / 1024.0,
                    download: down_bps / 1024.0,
                },
                format::format_network_info(up_bps, down_bps),
            ))
        })
        .await?
    }

    #[instrument(skip(self), fields(collector = "proc", operation = "connections"))]
    pub async fn connections(&self) -> Result<Vec<Connection>, CollectionError> {
        Ok(tokio::task::spawn_blocking(linux::read_socket_table).await??)
    }

    /// All processes, busiest first.
    #[instrument(skip(self), fields(collector = "sysinfo", operation = "processes"))]
    pub async fn processes(&self) -> Result<Vec<ProcessStat>, CollectionError> {
        let sys = self.sys.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = sys
                .lock()
                .map_err(|_| CollectionError::LockPoisoned("sysinfo"))?;
            sys.refresh_memory();
            sys.refresh_processes(ProcessesToUpdate::All, true);
            let total_memory = sys.total_memory();
            let mut processes: Vec<ProcessStat> = sys
                .processes()
                .iter()
                .map(|(pid, p)| ProcessStat {
                    pid: pid.as_u32(),
                    name: p.name().to_string_lossy().into_owned(),
                    cpu_percent: p.cpu_usage() as f64,
                    memory_percent: format::percent_of(p.memory(), total_memory),
                })
                .collect();
            processes.sort_by(|a, b| b.cpu_percent.total_cmp(&a.cpu_percent));
            Ok(processes)
        })
        .await?
    }

    pub async fn services(&self) -> BTreeMap<String, bool> {
        command::service_status(&self.services, COMMAND_TIMEOUT).await
    }
}

/// Use the collected value, or the placeholder when collection failed (tagging the section).
fn settle<T>(
    section: Section,
    result: Result<T, CollectionError>,
    placeholder: impl FnOnce() -> T,
    failed: &mut Vec<Section>,
) -> T {
    match result {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(?section, error = %e, operation = "collect", "section failed; using placeholder");
            if !failed.contains(&section) {
                failed.push(section);
            }
            placeholder()
        }
    }
}

impl MetricCollector for SysinfoCollector {
    async fn collect(&self) -> Result<Snapshot, CollectionError> {
        let (host, cpu, memory, disk, rates, connections, processes, services) = tokio::join!(
            self.host_stats(),
            self.cpu_stats(),
            self.memory_stats(),
            self.disk_stats(),
            self.network_rates(),
            self.connections(),
            self.processes(),
            self.services(),
        );

        let mut failed = Vec::new();
        let host = settle(Section::Host, host, HostStats::placeholder, &mut failed);
        let cpu = settle(Section::Cpu, cpu, CpuStats::placeholder, &mut failed);
        let memory = settle(Section::Memory, memory, MemoryStats::placeholder, &mut failed);
        let disk = settle(Section::Disk, disk, DiskStats::placeholder, &mut failed);
        let (utilization, info) = settle(
            Section::Network,
            rates,
            || (NetworkUtilization::default(), NOT_AVAILABLE.to_string()),
            &mut failed,
        );
        let connections = settle(Section::Network, connections, Vec::new, &mut failed);
        let processes = settle(Section::Processes, processes, Vec::new, &mut failed);

        let now = chrono::Local::now();
        Ok(Snapshot {
            generation: 0,
            timestamp: now.timestamp_millis().max(0) as u64,
            current_time: now.format("%Y-%m-%d %H:%M:%S").to_string(),
            host,
            cpu,
            memory,
            disk,
            network: NetworkStats {
                utilization,
                info,
                connections,
            },
            processes,
            services,
            failed,
        })
    }
}
