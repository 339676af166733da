// Network throughput and socket table models

use serde::{Deserialize, Serialize};

use super::system::NOT_AVAILABLE;

/// Host-wide throughput in KB/s.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NetworkUtilization {
    pub upload: f64,
    pub download: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Tcp,
    Udp,
}

impl Transport {
    pub fn label(self) -> &'static str {
        match self {
            Transport::Tcp => "TCP",
            Transport::Udp => "UDP",
        }
    }
}

/// Socket state; serializes to the kernel spelling (e.g. "TIME_WAIT").
/// Sockets without a state (UDP) and unknown strings map to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionStatus {
    Established,
    Listen,
    TimeWait,
    CloseWait,
    SynSent,
    SynRecv,
    #[serde(rename = "FIN_WAIT1")]
    FinWait1,
    #[serde(rename = "FIN_WAIT2")]
    FinWait2,
    LastAck,
    Closing,
    Close,
    #[serde(other)]
    None,
}

impl ConnectionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionStatus::Established => "ESTABLISHED",
            ConnectionStatus::Listen => "LISTEN",
            ConnectionStatus::TimeWait => "TIME_WAIT",
            ConnectionStatus::CloseWait => "CLOSE_WAIT",
            ConnectionStatus::SynSent => "SYN_SENT",
            ConnectionStatus::SynRecv => "SYN_RECV",
            ConnectionStatus::FinWait1 => "FIN_WAIT1",
            ConnectionStatus::FinWait2 => "FIN_WAIT2",
            ConnectionStatus::LastAck => "LAST_ACK",
            ConnectionStatus::Closing => "CLOSING",
            ConnectionStatus::Close => "CLOSE",
            ConnectionStatus::None => "NONE",
        }
    }

    /// Parse the two-digit hex state column of /proc/net/tcp.
    pub fn from_proc_hex(s: &str) -> Self {
        match u8::from_str_radix(s, 16) {
            Ok(0x01) => ConnectionStatus::Established,
            Ok(0x02) => ConnectionStatus::SynSent,
            Ok(0x03) => ConnectionStatus::SynRecv,
            Ok(0x04) => ConnectionStatus::FinWait1,
            Ok(0x05) => ConnectionStatus::FinWait2,
            Ok(0x06) => ConnectionStatus::TimeWait,
            Ok(0x07) => ConnectionStatus::Close,
            Ok(0x08) => ConnectionStatus::CloseWait,
            Ok(0x09) => ConnectionStatus::LastAck,
            Ok(0x0A) => ConnectionStatus::Listen,
            Ok(0x0B) => ConnectionStatus::Closing,
            _ => ConnectionStatus::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub transport: Transport,
    /// "ip:port"
    pub local_addr: String,
    /// "ip:port", empty when the socket has no peer.
    pub remote_addr: String,
    pub status: ConnectionStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStats {
    pub utilization: NetworkUtilization,
    /// e.g. "Upload: 1.20 KB/s, Download: 14.02 KB/s"
    pub info: String,
    pub connections: Vec<Connection>,
}

impl NetworkStats {
    pub fn placeholder() -> Self {
        Self {
            utilization: NetworkUtilization::default(),
            info: NOT_AVAILABLE.into(),
            connections: vec![],
        }
    }
}
