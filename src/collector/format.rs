// Human-readable formatting for the text fields of a snapshot.

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// 1024-based size with two decimals, e.g. `1536.0` -> "1.50 KB".
pub fn format_bytes(bytes: f64) -> String {
    let mut value = bytes.max(0.0);
    for unit in UNITS {
        if value < 1024.0 {
            return format!("{value:.2} {unit}");
        }
        value /= 1024.0;
    }
    format!("{value:.2} PB")
}

pub fn bytes_to_gb(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0 * 1024.0)
}

/// e.g. 93_784 -> "26h 3m 4s"
pub fn format_uptime(secs: u64) -> String {
    format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
}

pub fn format_load_avg(one: f64, five: f64, fifteen: f64) -> String {
    format!("1 min: {one:.2}, 5 min: {five:.2}, 15 min: {fifteen:.2}")
}

/// Rates are bytes/sec.
pub fn format_network_info(upload: f64, download: f64) -> String {
    format!(
        "Upload: {}/s, Download: {}/s",
        format_bytes(upload),
        format_bytes(download)
    )
}

pub fn percent_of(part: u64, total: u64) -> f64 {
    if total > 0 {
        (part as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_bytes_picks_unit() {
        assert_eq!(format_bytes(0.0), "0.00 B");
        assert_eq!(format_bytes(1023.0), "1023.00 B");
        assert_eq!(format_bytes(1536.0), "1.50 KB");
        assert_eq!(format_bytes(5.0 * 1024.0 * 1024.0), "5.00 MB");
    }

    #[test]
    fn format_uptime_splits_hours_minutes_seconds() {
        assert_eq!(format_uptime(0), "0h 0m 0s");
        assert_eq!(format_uptime(93_784), "26h 3m 4s");
    }

    #[test]
    fn format_network_info_matches_wire_text() {
        assert_eq!(
            format_network_info(1024.0, 2048.0),
            "Upload: 1.00 KB/s, Download: 2.00 KB/s"
        );
    }

    #[test]
    fn percent_of_zero_total_is_zero() {
        assert_eq!(percent_of(5, 0), 0.0);
        assert_eq!(percent_of(1, 4), 25.0);
    }
}
