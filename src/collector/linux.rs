// Linux-specific helpers: /proc, /etc/os-release, socket tables, disk counters.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::models::{Connection, ConnectionStatus, Transport};

const SECTOR_SIZE: u64 = 512;

/// Read first "model name" from /proc/cpuinfo (Linux). Prefer over sysinfo when it returns "cpu0" etc.
pub(super) fn read_cpu_model_linux() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/proc/cpuinfo").ok()?;
        for line in content.lines() {
            if line.starts_with("model name") {
                let name = line
                    .find(": ")
                    .map(|i| line[i + 2..].trim())
                    .filter(|s| !s.is_empty() && *s != "cpu0")?;
                return Some(name.to_string());
            }
        }
    }
    None
}

/// PRETTY_NAME from /etc/os-release, e.g. "Debian GNU/Linux 12 (bookworm)".
pub(super) fn read_os_pretty_name_linux() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/etc/os-release").ok()?;
        return parse_os_release_pretty_name(&content);
    }
    #[cfg(not(target_os = "linux"))]
    None
}

fn parse_os_release_pretty_name(content: &str) -> Option<String> {
    content
        .lines()
        .find_map(|line| line.strip_prefix("PRETTY_NAME="))
        .map(|v| v.trim().trim_matches('"').to_string())
        .filter(|v| !v.is_empty())
}

/// Cumulative (read, written) bytes across whole block devices since boot.
pub(super) fn read_disk_io_totals() -> Option<(u64, u64)> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/proc/diskstats").ok()?;
        return Some(parse_diskstats(&content, |name| {
            std::path::Path::new("/sys/block").join(name).exists()
        }));
    }
    #[cfg(not(target_os = "linux"))]
    None
}

/// Sums sectors read/written (fields 6 and 10) for devices accepted by `is_whole_disk`,
/// skipping loop and ram devices so partitions and virtual disks are not double counted.
fn parse_diskstats(content: &str, is_whole_disk: impl Fn(&str) -> bool) -> (u64, u64) {
    let mut read = 0u64;
    let mut written = 0u64;
    for line in content.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 10 {
            continue;
        }
        let name = fields[2];
        if name.starts_with("loop") || name.starts_with("ram") || !is_whole_disk(name) {
            continue;
        }
        let sectors_read = fields[5].parse::<u64>().unwrap_or(0);
        let sectors_written = fields[9].parse::<u64>().unwrap_or(0);
        read = read.saturating_add(sectors_read * SECTOR_SIZE);
        written = written.saturating_add(sectors_written * SECTOR_SIZE);
    }
    (read, written)
}

/// All inet sockets from /proc/net/{tcp,tcp6,udp,udp6}. Missing tables (e.g. IPv6
/// disabled) are skipped; fails only when none can be read.
pub(super) fn read_socket_table() -> std::io::Result<Vec<Connection>> {
    #[cfg(target_os = "linux")]
    {
        let tables = [
            ("/proc/net/tcp", Transport::Tcp, false),
            ("/proc/net/tcp6", Transport::Tcp, true),
            ("/proc/net/udp", Transport::Udp, false),
            ("/proc/net/udp6", Transport::Udp, true),
        ];
        let mut connections = Vec::new();
        let mut last_err = None;
        let mut any_read = false;
        for (path, transport, ipv6) in tables {
            match std::fs::read_to_string(path) {
                Ok(content) => {
                    any_read = true;
                    connections.extend(parse_proc_net(&content, transport, ipv6));
                }
                Err(e) => last_err = Some(e),
            }
        }
        if !any_read && let Some(e) = last_err {
            return Err(e);
        }
        return Ok(connections);
    }
    #[cfg(not(target_os = "linux"))]
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "socket table is only read on Linux",
    ))
}

fn parse_proc_net(content: &str, transport: Transport, ipv6: bool) -> Vec<Connection> {
    content
        .lines()
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 4 {
                return None;
            }
            let (local_ip, local_port) = parse_socket_addr(fields[1], ipv6)?;
            let (remote_ip, remote_port) = parse_socket_addr(fields[2], ipv6)?;
            let status = match transport {
                Transport::Tcp => ConnectionStatus::from_proc_hex(fields[3]),
                Transport::Udp => ConnectionStatus::None,
            };
            let remote_addr = if remote_ip.is_unspecified() && remote_port == 0 {
                String::new()
            } else {
                format!("{remote_ip}:{remote_port}")
            };
            Some(Connection {
                transport,
                local_addr: format!("{local_ip}:{local_port}"),
                remote_addr,
                status,
            })
        })
        .collect()
}

/// "0100007F:0035" -> (127.0.0.1, 53). Addresses are stored as host-order 32-bit words.
fn parse_socket_addr(s: &str, ipv6: bool) -> Option<(IpAddr, u16)> {
    let (addr_hex, port_hex) = s.split_once(':')?;
    let port = u16::from_str_radix(port_hex, 16).ok()?;
    let ip = if ipv6 {
        if addr_hex.len() != 32 {
            return None;
        }
        let mut octets = [0u8; 16];
        for (i, chunk) in octets.chunks_exact_mut(4).enumerate() {
            let word = u32::from_str_radix(&addr_hex[i * 8..i * 8 + 8], 16).ok()?;
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        IpAddr::V6(Ipv6Addr::from(octets))
    } else {
        if addr_hex.len() != 8 {
            return None;
        }
        let word = u32::from_str_radix(addr_hex, 16).ok()?;
        IpAddr::V4(Ipv4Addr::from(word.to_le_bytes()))
    };
    Some((ip, port))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TCP_TABLE: &str = "\
  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode
   0: 0100007F:0277 00000000:0000 0A 00000000:00000000 00:00000000 00000000     0        0 16421 1
   1: 0F02000A:0016 0202000A:C5D8 01 00000000:00000000 02:0009CBB6 00000000     0        0 20312 4
   2: 0F02000A:0016 0202000A:C5D9 06 00000000:00000000 03:00000F9E 00000000     0        0 0 3
";

    #[test]
    fn parse_proc_net_reads_tcp_v4_rows() {
        let rows = parse_proc_net(TCP_TABLE, Transport::Tcp, false);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].local_addr, "127.0.0.1:631");
        assert_eq!(rows[0].remote_addr, "");
        assert_eq!(rows[0].status, ConnectionStatus::Listen);
        assert_eq!(rows[1].local_addr, "10.0.2.15:22");
        assert_eq!(rows[1].remote_addr, "10.0.2.2:50648");
        assert_eq!(rows[1].status, ConnectionStatus::Established);
        assert_eq!(rows[2].status, ConnectionStatus::TimeWait);
    }

    #[test]
    fn parse_proc_net_udp_has_no_state() {
        let udp = "\
  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode ref pointer drops
  12: 00000000:0044 00000000:0000 07 00000000:00000000 00:00000000 00000000     0        0 17011 2 0 0
";
        let rows = parse_proc_net(udp, Transport::Udp, false);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].local_addr, "0.0.0.0:68");
        assert_eq!(rows[0].status, ConnectionStatus::None);
    }

    #[test]
    fn parse_socket_addr_ipv6_loopback() {
        let (ip, port) = parse_socket_addr("00000000000000000000000001000000:1F90", true).unwrap();
        assert_eq!(ip, IpAddr::V6(Ipv6Addr::LOCALHOST));
        assert_eq!(port, 8080);
    }

    #[test]
    fn parse_socket_addr_rejects_garbage() {
        assert!(parse_socket_addr("zz", false).is_none());
        assert!(parse_socket_addr("0100007F", false).is_none());
        assert!(parse_socket_addr("0100:0016", false).is_none());
    }

    #[test]
    fn parse_diskstats_sums_whole_disks_only() {
        let content = "\
   7       0 loop0 10 0 100 0 0 0 0 0 0 0 0
   8       0 sda 100 0 2000 50 40 0 1000 20 0 60 70
   8       1 sda1 90 0 1900 45 38 0 900 18 0 55 65
 259       0 nvme0n1 10 0 4 1 2 0 8 1 0 2 2
";
        let (read, written) = parse_diskstats(content, |name| name == "sda" || name == "nvme0n1");
        assert_eq!(read, (2000 + 4) * 512);
        assert_eq!(written, (1000 + 8) * 512);
    }

    #[test]
    fn parse_os_release_prefers_pretty_name() {
        let content = "NAME=\"Debian GNU/Linux\"\nPRETTY_NAME=\"Debian GNU/Linux 12 (bookworm)\"\n";
        assert_eq!(
            parse_os_release_pretty_name(content).as_deref(),
            Some("Debian GNU/Linux 12 (bookworm)")
        );
        assert_eq!(parse_os_release_pretty_name("NAME=x\n"), None);
    }
}
