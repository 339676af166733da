// Shared test helpers

#![allow(dead_code)]

use hostpulse::models::*;
use std::collections::BTreeMap;

pub fn sample_snapshot(generation: u64) -> Snapshot {
    Snapshot {
        generation,
        timestamp: 1_700_000_000_000 + generation,
        current_time: "2026-10-17 12:00:00".into(),
        host: HostStats {
            hostname: "testbox".into(),
            uptime: "1h 2m 3s".into(),
            os_release: "Debian GNU/Linux 12 (bookworm)".into(),
            kernel_version: "6.1.0".into(),
            logged_in_users: 2,
        },
        cpu: CpuStats {
            model: "Test CPU".into(),
            frequency: "2400 MHz".into(),
            load_avg: "0.10, 0.20, 0.30".into(),
            utilization_percent: 42.0,
            per_core_percent: vec![10.0, 60.0, 90.0],
        },
        memory: MemoryStats {
            total_gb: 16.0,
            available_gb: 8.0,
            used_gb: 8.0,
            utilization_percent: 50.0,
            swap_utilization_percent: 0.0,
        },
        disk: DiskStats {
            utilization_percent: 80.0,
            read: "1.00 MB".into(),
            write: "512.00 KB".into(),
        },
        network: NetworkStats {
            utilization: NetworkUtilization {
                upload: 12.5,
                download: 100.0,
            },
            info: "Upload: 12.50 KB/s, Download: 100.00 KB/s".into(),
            connections: vec![
                Connection {
                    transport: Transport::Tcp,
                    local_addr: "127.0.0.1:8003".into(),
                    remote_addr: String::new(),
                    status: ConnectionStatus::Listen,
                },
                Connection {
                    transport: Transport::Tcp,
                    local_addr: "10.0.0.2:22".into(),
                    remote_addr: "10.0.0.9:51000".into(),
                    status: ConnectionStatus::Established,
                },
            ],
        },
        processes: vec![
            ProcessStat {
                pid: 1,
                name: "init".into(),
                cpu_percent: 10.0,
                memory_percent: 1.0,
            },
            ProcessStat {
                pid: 2,
                name: "worker".into(),
                cpu_percent: 90.0,
                memory_percent: 5.0,
            },
        ],
        services: BTreeMap::from([("MariaDB".to_string(), true), ("Nginx".to_string(), false)]),
        failed: vec![],
    }
}

pub fn sample_json(generation: u64) -> serde_json::Value {
    serde_json::to_value(sample_snapshot(generation)).unwrap()
}

pub fn sample_text(generation: u64) -> String {
    serde_json::to_string(&sample_snapshot(generation)).unwrap()
}
