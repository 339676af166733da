// Model serialization tests (JSON camelCase, status spelling, placeholders)

mod common;

use hostpulse::models::*;

#[test]
fn test_snapshot_serialization_camel_case() {
    let json = serde_json::to_value(common::sample_snapshot(3)).unwrap();
    assert_eq!(json["generation"], 3);
    assert_eq!(json["currentTime"], "2026-10-17 12:00:00");
    assert_eq!(json["host"]["osRelease"], "Debian GNU/Linux 12 (bookworm)");
    assert_eq!(json["host"]["loggedInUsers"], 2);
    assert_eq!(json["cpu"]["utilizationPercent"], 42.0);
    assert_eq!(json["cpu"]["perCorePercent"][2], 90.0);
    assert_eq!(json["memory"]["swapUtilizationPercent"], 0.0);
    assert_eq!(json["network"]["utilization"]["download"], 100.0);
    assert_eq!(json["processes"][1]["cpuPercent"], 90.0);
    assert_eq!(json["services"]["MariaDB"], true);
}

#[test]
fn test_connection_status_uses_kernel_spelling() {
    let c = Connection {
        transport: Transport::Tcp,
        local_addr: "0.0.0.0:22".into(),
        remote_addr: "1.2.3.4:5555".into(),
        status: ConnectionStatus::TimeWait,
    };
    let json = serde_json::to_value(&c).unwrap();
    assert_eq!(json["status"], "TIME_WAIT");
    assert_eq!(json["transport"], "tcp");
    assert_eq!(json["localAddr"], "0.0.0.0:22");

    let fin: ConnectionStatus = serde_json::from_str("\"FIN_WAIT1\"").unwrap();
    assert_eq!(fin, ConnectionStatus::FinWait1);
    assert_eq!(serde_json::to_string(&ConnectionStatus::FinWait2).unwrap(), "\"FIN_WAIT2\"");
}

#[test]
fn test_unknown_connection_status_maps_to_none() {
    let s: ConnectionStatus = serde_json::from_str("\"NEW_SYN_RECV\"").unwrap();
    assert_eq!(s, ConnectionStatus::None);
    assert_eq!(s.as_str(), "NONE");
}

#[test]
fn test_status_from_proc_hex() {
    assert_eq!(ConnectionStatus::from_proc_hex("01"), ConnectionStatus::Established);
    assert_eq!(ConnectionStatus::from_proc_hex("0A"), ConnectionStatus::Listen);
    assert_eq!(ConnectionStatus::from_proc_hex("06"), ConnectionStatus::TimeWait);
    assert_eq!(ConnectionStatus::from_proc_hex("zz"), ConnectionStatus::None);
}

#[test]
fn test_placeholder_snapshot_keeps_every_key() {
    let snap = Snapshot::placeholder(9);
    assert!(snap.is_degraded());
    assert_eq!(snap.failed.len(), Section::ALL.len());
    let json = serde_json::to_value(&snap).unwrap();
    for key in [
        "generation",
        "timestamp",
        "currentTime",
        "host",
        "cpu",
        "memory",
        "disk",
        "network",
        "processes",
        "services",
        "failed",
    ] {
        assert!(json.get(key).is_some(), "missing key {key}");
    }
    assert_eq!(json["host"]["hostname"], NOT_AVAILABLE);
    assert_eq!(json["failed"][0], "host");
}

#[test]
fn test_mark_failed_is_idempotent() {
    let mut snap = common::sample_snapshot(1);
    assert!(!snap.is_degraded());
    snap.mark_failed(Section::Cpu);
    snap.mark_failed(Section::Cpu);
    assert_eq!(snap.failed, vec![Section::Cpu]);
}

#[test]
fn test_snapshot_without_failed_field_deserializes() {
    let mut json = common::sample_json(4);
    json.as_object_mut().unwrap().remove("failed");
    let snap: Snapshot = serde_json::from_value(json).unwrap();
    assert!(snap.failed.is_empty());
    assert_eq!(snap.generation, 4);
}
