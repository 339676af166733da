//! Client-local sort preferences for the process and connection tables.

use std::cmp::Ordering;
use std::str::FromStr;

use crate::models::{Connection, ProcessStat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    pub fn indicator(self) -> &'static str {
        match self {
            SortOrder::Asc => "▲",
            SortOrder::Desc => "▼",
        }
    }

    fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    }
}

/// A sortable table column and the order it starts in when first selected.
pub trait SortColumn: Copy + Eq {
    fn default_order(self) -> SortOrder;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessColumn {
    Pid,
    Name,
    Cpu,
    Mem,
}

impl SortColumn for ProcessColumn {
    fn default_order(self) -> SortOrder {
        match self {
            ProcessColumn::Name => SortOrder::Asc,
            ProcessColumn::Pid | ProcessColumn::Cpu | ProcessColumn::Mem => SortOrder::Desc,
        }
    }
}

impl FromStr for ProcessColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pid" => Ok(ProcessColumn::Pid),
            "name" | "command" => Ok(ProcessColumn::Name),
            "cpu" => Ok(ProcessColumn::Cpu),
            "mem" | "memory" => Ok(ProcessColumn::Mem),
            other => Err(format!("unknown process column `{other}`")),
        }
    }
}

/// Every connection column holds text, so all start ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionColumn {
    Proto,
    Local,
    Remote,
    Status,
}

impl SortColumn for ConnectionColumn {
    fn default_order(self) -> SortOrder {
        SortOrder::Asc
    }
}

impl FromStr for ConnectionColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "proto" => Ok(ConnectionColumn::Proto),
            "local" => Ok(ConnectionColumn::Local),
            "remote" => Ok(ConnectionColumn::Remote),
            "status" | "state" => Ok(ConnectionColumn::Status),
            other => Err(format!("unknown connection column `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState<C> {
    pub column: C,
    pub order: SortOrder,
}

impl<C: SortColumn> SortState<C> {
    pub fn new(column: C, order: SortOrder) -> Self {
        Self { column, order }
    }

    /// Same column flips the order; a different column starts at its default order.
    pub fn toggle(&mut self, column: C) {
        if self.column == column {
            self.order = self.order.flipped();
        } else {
            self.column = column;
            self.order = column.default_order();
        }
    }

    /// Indicator for a header cell, if `column` is the active one.
    pub fn indicator_for(&self, column: C) -> Option<SortOrder> {
        (self.column == column).then_some(self.order)
    }
}

impl Default for SortState<ProcessColumn> {
    fn default() -> Self {
        Self::new(ProcessColumn::Cpu, SortOrder::Desc)
    }
}

impl Default for SortState<ConnectionColumn> {
    fn default() -> Self {
        Self::new(ConnectionColumn::Status, SortOrder::Asc)
    }
}

pub fn sort_processes(list: &[ProcessStat], state: &SortState<ProcessColumn>) -> Vec<ProcessStat> {
    let mut sorted = list.to_vec();
    sorted.sort_by(|a, b| {
        let ord = match state.column {
            ProcessColumn::Pid => a.pid.cmp(&b.pid),
            ProcessColumn::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            ProcessColumn::Cpu => a.cpu_percent.total_cmp(&b.cpu_percent),
            ProcessColumn::Mem => a.memory_percent.total_cmp(&b.memory_percent),
        };
        state.order.apply(ord)
    });
    sorted
}

pub fn sort_connections(
    list: &[Connection],
    state: &SortState<ConnectionColumn>,
) -> Vec<Connection> {
    let mut sorted = list.to_vec();
    sorted.sort_by(|a, b| {
        let ord = match state.column {
            ConnectionColumn::Proto => a.transport.label().cmp(b.transport.label()),
            ConnectionColumn::Local => a.local_addr.cmp(&b.local_addr),
            ConnectionColumn::Remote => a.remote_addr.cmp(&b.remote_addr),
            ConnectionColumn::Status => a.status.as_str().cmp(b.status.as_str()),
        };
        state.order.apply(ord)
    });
    sorted
}
