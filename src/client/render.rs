//! Snapshot -> widgets. Every widget reads only its own part of the raw JSON, so a
//! missing or malformed section blanks that widget and nothing else.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use super::history::NetworkHistory;
use super::sort::{
    ConnectionColumn, ProcessColumn, SortState, sort_connections, sort_processes,
};
use super::surface::{
    BarView, Cell, CoreBar, HeaderCell, Surface, TableView, UtilizationClass, Widget, slots,
};
use crate::error::RenderError;
use crate::models::{
    Connection, ConnectionStatus, DiskStats, HostStats, MemoryStats, NetworkUtilization,
    ProcessStat, Section,
};

/// Combined upload+download (KB/s) drawn as a full network bar.
pub const MAX_NETWORK_KBPS: f64 = 10_000.0;

type Updates = Vec<(String, Widget)>;

/// `<50` green, `<75` yellow, otherwise red.
pub fn classify(percent: f64) -> UtilizationClass {
    if percent < 50.0 {
        UtilizationClass::Green
    } else if percent < 75.0 {
        UtilizationClass::Yellow
    } else {
        UtilizationClass::Red
    }
}

pub fn utilization_bar(percent: f64) -> BarView {
    let class = classify(percent);
    BarView {
        fill_percent: percent.clamp(0.0, 100.0),
        class,
        label: format!("{percent:.2} %"),
        dark_text: class == UtilizationClass::Yellow,
    }
}

/// Bar for combined throughput; the label reuses the server's info text as "up / down".
pub fn network_bar(utilization: NetworkUtilization, info: &str) -> BarView {
    let percent = (utilization.upload + utilization.download) / MAX_NETWORK_KBPS * 100.0;
    let class = classify(percent);
    BarView {
        fill_percent: percent.clamp(0.0, 100.0),
        class,
        label: info.replace("Upload: ", "").replace(", Download: ", " / "),
        dark_text: class == UtilizationClass::Yellow,
    }
}

pub fn cpu_class(percent: f64) -> &'static str {
    if percent >= 80.0 {
        "cpu-critical"
    } else if percent >= 50.0 {
        "cpu-high"
    } else if percent >= 20.0 {
        "cpu-medium"
    } else {
        "cpu-low"
    }
}

pub fn mem_class(percent: f64) -> &'static str {
    if percent >= 50.0 {
        "mem-high"
    } else if percent >= 20.0 {
        "mem-medium"
    } else {
        "mem-low"
    }
}

pub fn status_class(status: ConnectionStatus) -> Option<&'static str> {
    match status {
        ConnectionStatus::Established => Some("status-established"),
        ConnectionStatus::Listen => Some("status-listen"),
        ConnectionStatus::TimeWait => Some("status-time-wait"),
        ConnectionStatus::CloseWait => Some("status-close-wait"),
        ConnectionStatus::SynSent => Some("status-syn-sent"),
        ConnectionStatus::SynRecv => Some("status-syn-recv"),
        _ => None,
    }
}

pub fn process_table(list: &[ProcessStat], sort: &SortState<ProcessColumn>) -> TableView {
    let header = [
        ("pid", "PID", ProcessColumn::Pid),
        ("name", "COMMAND", ProcessColumn::Name),
        ("cpu", "CPU%", ProcessColumn::Cpu),
        ("mem", "MEM%", ProcessColumn::Mem),
    ]
    .into_iter()
    .map(|(key, title, column)| HeaderCell {
        key,
        title,
        indicator: sort.indicator_for(column),
    })
    .collect();
    let rows = sort_processes(list, sort)
        .into_iter()
        .map(|p| {
            vec![
                Cell::plain(p.pid.to_string()),
                Cell::plain(p.name),
                Cell::styled(format!("{:.1}", p.cpu_percent), cpu_class(p.cpu_percent)),
                Cell::styled(
                    format!("{:.1}", p.memory_percent),
                    mem_class(p.memory_percent),
                ),
            ]
        })
        .collect::<Vec<_>>();
    let footer = (!rows.is_empty()).then(|| format!("{} processes", rows.len()));
    TableView {
        header,
        rows,
        footer,
    }
}

/// Sockets without a state (`NONE`) are not shown.
pub fn connection_table(list: &[Connection], sort: &SortState<ConnectionColumn>) -> TableView {
    let header = [
        ("proto", "PROTO", ConnectionColumn::Proto),
        ("local", "LOCAL ADDRESS", ConnectionColumn::Local),
        ("remote", "REMOTE ADDRESS", ConnectionColumn::Remote),
        ("status", "STATE", ConnectionColumn::Status),
    ]
    .into_iter()
    .map(|(key, title, column)| HeaderCell {
        key,
        title,
        indicator: sort.indicator_for(column),
    })
    .collect();
    let visible: Vec<Connection> = list
        .iter()
        .filter(|c| c.status != ConnectionStatus::None)
        .cloned()
        .collect();
    let rows = sort_connections(&visible, sort)
        .into_iter()
        .map(|c| {
            let status = match status_class(c.status) {
                Some(class) => Cell::styled(c.status.as_str(), class),
                None => Cell::plain(c.status.as_str()),
            };
            vec![
                Cell::plain(c.transport.label()),
                Cell::plain(dash_if_empty(c.local_addr)),
                Cell::plain(dash_if_empty(c.remote_addr)),
                status,
            ]
        })
        .collect();
    TableView {
        header,
        rows,
        footer: None,
    }
}

fn dash_if_empty(s: String) -> String {
    if s.is_empty() { "-".into() } else { s }
}

/// Deserialize the value at `path`; absent or null counts as missing.
fn field<T: DeserializeOwned>(
    root: &Value,
    path: &[&str],
    name: &'static str,
) -> Result<T, RenderError> {
    let mut v = root;
    for key in path {
        v = v.get(key).ok_or(RenderError::Missing(name))?;
    }
    if v.is_null() {
        return Err(RenderError::Missing(name));
    }
    T::deserialize(v).map_err(|source| RenderError::Malformed {
        field: name,
        source,
    })
}

/// Write the widget's updates, or placeholders into all of its slots on failure.
fn apply<S: Surface + ?Sized>(
    surface: &mut S,
    widget: &'static str,
    placeholder_slots: &[&str],
    result: Result<Updates, RenderError>,
) -> bool {
    match result {
        Ok(updates) => {
            for (slot, w) in updates {
                surface.update(&slot, w);
            }
            true
        }
        Err(e) => {
            tracing::warn!(widget, error = %e, "widget render failed; showing placeholder");
            for slot in placeholder_slots {
                surface.update(slot, Widget::Placeholder);
            }
            false
        }
    }
}

fn text(slot: &str, s: String) -> (String, Widget) {
    (slot.to_string(), Widget::Text(s))
}

fn general(root: &Value) -> Result<Updates, RenderError> {
    let host: HostStats = field(root, &["host"], "host")?;
    Ok(vec![
        text(slots::HOSTNAME, format!("Hostname: {}", host.hostname)),
        text(slots::UPTIME, format!("Uptime: {}", host.uptime)),
        text(slots::OS_RELEASE, format!("OS: {}", host.os_release)),
        text(slots::KERNEL_VERSION, format!("Kernel: {}", host.kernel_version)),
        text(
            slots::LOGGED_IN_USERS,
            format!("Logged-in Users: {}", host.logged_in_users),
        ),
    ])
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CpuSummary {
    model: String,
    frequency: String,
    load_avg: String,
    utilization_percent: f64,
}

fn cpu(root: &Value) -> Result<Updates, RenderError> {
    let cpu: CpuSummary = field(root, &["cpu"], "cpu")?;
    Ok(vec![
        text(slots::CPU_INFO, format!("Model: {}", cpu.model)),
        text(slots::CPU_FREQUENCY, format!("Frequency: {}", cpu.frequency)),
        text(slots::LOAD_AVG, format!("Load Avg: {}", cpu.load_avg)),
        (
            slots::CPU_UTILIZATION.to_string(),
            Widget::Bar(utilization_bar(cpu.utilization_percent)),
        ),
    ])
}

fn cpu_chart(root: &Value) -> Result<Updates, RenderError> {
    let per_core: Vec<f64> = field(root, &["cpu", "perCorePercent"], "cpu.perCorePercent")?;
    let bars = per_core
        .into_iter()
        .enumerate()
        .map(|(i, percent)| CoreBar {
            label: format!("CPU {i}"),
            percent,
            class: classify(percent),
        })
        .collect();
    Ok(vec![(slots::CPU_CHART.to_string(), Widget::CoreChart(bars))])
}

fn memory(root: &Value) -> Result<Updates, RenderError> {
    let mem: MemoryStats = field(root, &["memory"], "memory")?;
    Ok(vec![
        text(
            slots::MEMORY_INFO,
            format!(
                "Total: {:.2} GB | Available: {:.2} GB | Used: {:.2} GB",
                mem.total_gb, mem.available_gb, mem.used_gb
            ),
        ),
        (
            slots::MEMORY_UTILIZATION.to_string(),
            Widget::Bar(utilization_bar(mem.utilization_percent)),
        ),
        (
            slots::SWAP_UTILIZATION.to_string(),
            Widget::Bar(utilization_bar(mem.swap_utilization_percent)),
        ),
    ])
}

fn disk(root: &Value) -> Result<Updates, RenderError> {
    let disk: DiskStats = field(root, &["disk"], "disk")?;
    Ok(vec![
        (
            slots::DISK_UTILIZATION.to_string(),
            Widget::Bar(utilization_bar(disk.utilization_percent)),
        ),
        text(
            slots::DISK_READ_WRITE,
            format!("Disk I/O - Read: {}, Write: {}", disk.read, disk.write),
        ),
    ])
}

/// Also appends one sample to the rolling chart history.
fn network(
    root: &Value,
    history: &mut NetworkHistory,
    sample_label: &str,
) -> Result<Updates, RenderError> {
    let utilization: NetworkUtilization =
        field(root, &["network", "utilization"], "network.utilization")?;
    let info: String = field(root, &["network", "info"], "network.info")?;
    history.push(sample_label, utilization);
    Ok(vec![
        (
            slots::NETWORK_UTILIZATION.to_string(),
            Widget::Bar(network_bar(utilization, &info)),
        ),
        text(slots::NETWORK_INFO, info),
        (
            slots::NETWORK_CHART.to_string(),
            Widget::Series(history.to_series()),
        ),
    ])
}

fn connections(root: &Value, sort: &SortState<ConnectionColumn>) -> Result<Updates, RenderError> {
    let list: Vec<Connection> =
        field(root, &["network", "connections"], "network.connections")?;
    Ok(vec![(
        slots::NETWORK_CONNECTIONS.to_string(),
        Widget::Table(connection_table(&list, sort)),
    )])
}

fn processes(root: &Value, sort: &SortState<ProcessColumn>) -> Result<Updates, RenderError> {
    let list: Vec<ProcessStat> = field(root, &["processes"], "processes")?;
    Ok(vec![(
        slots::PROCESS_LIST.to_string(),
        Widget::Table(process_table(&list, sort)),
    )])
}

fn service_updates(services: BTreeMap<String, bool>) -> Updates {
    let up = services.values().filter(|v| **v).count();
    let mut updates = vec![text(
        slots::SERVICES,
        format!("{up}/{} services up", services.len()),
    )];
    updates.extend(
        services
            .into_iter()
            .map(|(name, active)| (slots::service(&name), Widget::Status(active))),
    );
    updates
}

/// Per-service slots come and go with the server's service list; names that
/// disappear, or every known name when the section fails, are blanked.
fn render_services<S: Surface + ?Sized>(
    root: &Value,
    failed: &[Section],
    known: &mut BTreeSet<String>,
    surface: &mut S,
) -> bool {
    let result = unless_failed(failed, Section::Services, || {
        field::<BTreeMap<String, bool>>(root, &["services"], "services")
    });
    match result {
        Ok(services) => {
            for gone in known.iter().filter(|name| !services.contains_key(*name)) {
                surface.update(&slots::service(gone), Widget::Placeholder);
            }
            *known = services.keys().cloned().collect();
            apply(surface, "services", &[], Ok(service_updates(services)))
        }
        Err(e) => {
            let stale: Vec<String> = known.iter().map(|name| slots::service(name)).collect();
            let mut placeholder_slots = vec![slots::SERVICES];
            placeholder_slots.extend(stale.iter().map(String::as_str));
            apply(surface, "services", &placeholder_slots, Err(e))
        }
    }
}

fn last_updated(root: &Value) -> Result<Updates, RenderError> {
    let time: String = field(root, &["currentTime"], "currentTime")?;
    Ok(vec![text(slots::LAST_UPDATED, format!("Last updated: {time}"))])
}

/// Sections the server tagged as failed. An absent or unreadable list counts as none.
fn failed_sections(root: &Value) -> Vec<Section> {
    root.get("failed")
        .and_then(|v| Vec::<Section>::deserialize(v).ok())
        .unwrap_or_default()
}

/// Run `render` only if `section` collected cleanly; a tagged section holds
/// placeholder values that must not be drawn as real readings.
fn unless_failed<T>(
    failed: &[Section],
    section: Section,
    render: impl FnOnce() -> Result<T, RenderError>,
) -> Result<T, RenderError> {
    if failed.contains(&section) {
        return Err(RenderError::Degraded(section));
    }
    render()
}

pub fn render_process_table<S: Surface + ?Sized>(
    root: &Value,
    sort: &SortState<ProcessColumn>,
    surface: &mut S,
) -> bool {
    let failed = failed_sections(root);
    apply(
        surface,
        "processes",
        &[slots::PROCESS_LIST],
        unless_failed(&failed, Section::Processes, || processes(root, sort)),
    )
}

pub fn render_connection_table<S: Surface + ?Sized>(
    root: &Value,
    sort: &SortState<ConnectionColumn>,
    surface: &mut S,
) -> bool {
    let failed = failed_sections(root);
    apply(
        surface,
        "connections",
        &[slots::NETWORK_CONNECTIONS],
        unless_failed(&failed, Section::Network, || connections(root, sort)),
    )
}

/// Full render pass. Returns the number of widgets that fell back to a placeholder.
pub fn render_snapshot<S: Surface + ?Sized>(
    root: &Value,
    history: &mut NetworkHistory,
    known_services: &mut BTreeSet<String>,
    process_sort: &SortState<ProcessColumn>,
    connection_sort: &SortState<ConnectionColumn>,
    sample_label: &str,
    surface: &mut S,
) -> usize {
    let failed = failed_sections(root);
    let results = [
        apply(
            surface,
            "general",
            &[
                slots::HOSTNAME,
                slots::UPTIME,
                slots::OS_RELEASE,
                slots::KERNEL_VERSION,
                slots::LOGGED_IN_USERS,
            ],
            unless_failed(&failed, Section::Host, || general(root)),
        ),
        apply(
            surface,
            "cpu",
            &[
                slots::CPU_INFO,
                slots::CPU_FREQUENCY,
                slots::LOAD_AVG,
                slots::CPU_UTILIZATION,
            ],
            unless_failed(&failed, Section::Cpu, || cpu(root)),
        ),
        apply(
            surface,
            "cpu_chart",
            &[slots::CPU_CHART],
            unless_failed(&failed, Section::Cpu, || cpu_chart(root)),
        ),
        apply(
            surface,
            "memory",
            &[
                slots::MEMORY_INFO,
                slots::MEMORY_UTILIZATION,
                slots::SWAP_UTILIZATION,
            ],
            unless_failed(&failed, Section::Memory, || memory(root)),
        ),
        apply(
            surface,
            "disk",
            &[slots::DISK_UTILIZATION, slots::DISK_READ_WRITE],
            unless_failed(&failed, Section::Disk, || disk(root)),
        ),
        apply(
            surface,
            "network",
            &[
                slots::NETWORK_UTILIZATION,
                slots::NETWORK_INFO,
                slots::NETWORK_CHART,
            ],
            unless_failed(&failed, Section::Network, || {
                network(root, history, sample_label)
            }),
        ),
        render_connection_table(root, connection_sort, surface),
        render_process_table(root, process_sort, surface),
        render_services(root, &failed, known_services, surface),
        apply(
            surface,
            "last_updated",
            &[slots::LAST_UPDATED],
            last_updated(root),
        ),
    ];
    surface.flush();
    results.iter().filter(|ok| !**ok).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utilization_bar_clamps_fill_and_darkens_yellow_text() {
        let bar = utilization_bar(60.0);
        assert_eq!(bar.class.as_str(), "yellow");
        assert!(bar.dark_text);
        assert_eq!(bar.label, "60.00 %");
        assert_eq!(utilization_bar(140.0).fill_percent, 100.0);
        assert!(!utilization_bar(10.0).dark_text);
    }

    #[test]
    fn network_bar_uses_combined_rate_and_short_label() {
        let bar = network_bar(
            NetworkUtilization {
                upload: 2500.0,
                download: 2500.0,
            },
            "Upload: 2.44 MB/s, Download: 2.44 MB/s",
        );
        assert_eq!(bar.fill_percent, 50.0);
        assert_eq!(bar.class, UtilizationClass::Yellow);
        assert_eq!(bar.label, "2.44 MB/s / 2.44 MB/s");
    }

    #[test]
    fn process_row_classes() {
        assert_eq!(cpu_class(5.0), "cpu-low");
        assert_eq!(cpu_class(20.0), "cpu-medium");
        assert_eq!(cpu_class(50.0), "cpu-high");
        assert_eq!(cpu_class(80.0), "cpu-critical");
        assert_eq!(mem_class(19.9), "mem-low");
        assert_eq!(mem_class(20.0), "mem-medium");
        assert_eq!(mem_class(50.0), "mem-high");
    }

    #[test]
    fn field_reports_missing_and_malformed() {
        let root = serde_json::json!({ "cpu": null, "memory": { "totalGb": "lots" } });
        assert!(matches!(
            field::<CpuSummary>(&root, &["cpu"], "cpu"),
            Err(RenderError::Missing("cpu"))
        ));
        assert!(matches!(
            field::<MemoryStats>(&root, &["memory"], "memory"),
            Err(RenderError::Malformed { field: "memory", .. })
        ));
        assert!(matches!(
            field::<DiskStats>(&root, &["disk"], "disk"),
            Err(RenderError::Missing("disk"))
        ));
    }
}
