// Snapshot data model (wire format, camelCase JSON)

mod network;
mod process;
mod snapshot;
mod system;

pub use network::{Connection, ConnectionStatus, NetworkStats, NetworkUtilization, Transport};
pub use process::ProcessStat;
pub use snapshot::{Section, Snapshot};
pub use system::{CpuStats, DiskStats, HostStats, MemoryStats, NOT_AVAILABLE};
