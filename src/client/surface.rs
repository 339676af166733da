//! Output slots the dashboard renders into, keyed by metric name.

use std::collections::BTreeMap;

use super::sort::SortOrder;

/// Slot names written on every render pass.
pub mod slots {
    pub const HOSTNAME: &str = "hostname";
    pub const UPTIME: &str = "uptime_output";
    pub const OS_RELEASE: &str = "os_release";
    pub const KERNEL_VERSION: &str = "kernel_version";
    pub const LOGGED_IN_USERS: &str = "logged_in_users";
    pub const CPU_INFO: &str = "cpu_info";
    pub const CPU_FREQUENCY: &str = "cpu_frequency";
    pub const LOAD_AVG: &str = "load_avg";
    pub const CPU_UTILIZATION: &str = "cpu_utilization";
    pub const CPU_CHART: &str = "cpu_chart";
    pub const MEMORY_INFO: &str = "memory_info";
    pub const MEMORY_UTILIZATION: &str = "memory_utilization";
    pub const SWAP_UTILIZATION: &str = "swap_utilization";
    pub const DISK_UTILIZATION: &str = "disk_utilization";
    pub const DISK_READ_WRITE: &str = "disk_read_write";
    pub const NETWORK_UTILIZATION: &str = "network_utilization";
    pub const NETWORK_INFO: &str = "network_info";
    pub const NETWORK_CHART: &str = "network_chart";
    pub const NETWORK_CONNECTIONS: &str = "network_connections";
    pub const PROCESS_LIST: &str = "process_list";
    pub const SERVICES: &str = "services";
    pub const LAST_UPDATED: &str = "last_updated";

    /// Per-service slot, e.g. "service_MariaDB".
    pub fn service(name: &str) -> String {
        format!("service_{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtilizationClass {
    Green,
    Yellow,
    Red,
}

impl UtilizationClass {
    pub fn as_str(self) -> &'static str {
        match self {
            UtilizationClass::Green => "green",
            UtilizationClass::Yellow => "yellow",
            UtilizationClass::Red => "red",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarView {
    /// Fill width, 0..=100.
    pub fill_percent: f64,
    pub class: UtilizationClass,
    pub label: String,
    /// Yellow bars use dark text.
    pub dark_text: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCell {
    pub key: &'static str,
    pub title: &'static str,
    pub indicator: Option<SortOrder>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    pub class: Option<&'static str>,
}

impl Cell {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            class: None,
        }
    }

    pub fn styled(text: impl Into<String>, class: &'static str) -> Self {
        Self {
            text: text.into(),
            class: Some(class),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub header: Vec<HeaderCell>,
    pub rows: Vec<Vec<Cell>>,
    pub footer: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoreBar {
    pub label: String,
    pub percent: f64,
    pub class: UtilizationClass,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeriesView {
    pub labels: Vec<String>,
    pub upload: Vec<f64>,
    pub download: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    Text(String),
    Status(bool),
    Bar(BarView),
    Table(TableView),
    CoreChart(Vec<CoreBar>),
    Series(SeriesView),
    /// Shown when the widget's data was missing or malformed.
    Placeholder,
}

/// Sink for render output. Implementations must tolerate the same slot being
/// written any number of times.
pub trait Surface {
    fn update(&mut self, slot: &str, widget: Widget);

    /// Called once after a complete render pass.
    fn flush(&mut self) {}
}

/// In-memory surface: the latest widget per slot.
#[derive(Debug, Default, Clone)]
pub struct SlotMap {
    slots: BTreeMap<String, Widget>,
    passes: u64,
}

impl SlotMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: &str) -> Option<&Widget> {
        self.slots.get(slot)
    }

    pub fn text(&self, slot: &str) -> Option<&str> {
        match self.slots.get(slot) {
            Some(Widget::Text(t)) => Some(t.as_str()),
            _ => None,
        }
    }

    pub fn is_placeholder(&self, slot: &str) -> bool {
        matches!(self.slots.get(slot), Some(Widget::Placeholder))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Widget)> {
        self.slots.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Completed render passes.
    pub fn passes(&self) -> u64 {
        self.passes
    }
}

impl Surface for SlotMap {
    fn update(&mut self, slot: &str, widget: Widget) {
        self.slots.insert(slot.to_string(), widget);
    }

    fn flush(&mut self) {
        self.passes += 1;
    }
}
