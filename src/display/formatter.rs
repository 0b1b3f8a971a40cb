/// Human-readable byte formatting (B/K/M/G/T/P)
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "K", "M", "G", "T", "P"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1}{}", size, UNITS[unit_index])
    }
}

/// Format rate (bytes per second)
pub fn format_rate(bytes_per_second: f64) -> String {
    format!("{}/s", format_bytes(bytes_per_second.max(0.0).round() as u64))
}

/// Format operations per second
pub fn format_ops_per_second(ops: f64) -> String {
    format!("{:.1}/s", ops)
}

/// Format a latency given in seconds as milliseconds
pub fn format_latency_ms(seconds: f64) -> String {
    format!("{:.2}ms", seconds * 1000.0)
}

pub fn format_percent(percent: f64) -> String {
    format!("{:.2}%", percent)
}

/// Queue depths are whole entries
pub fn format_count(count: f64) -> String {
    format!("{:.0}", count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1024), "1.0K");
        assert_eq!(format_bytes(1536), "1.5K");
        assert_eq!(format_bytes(1024 * 1024), "1.0M");
        assert_eq!(format_bytes(1024 * 1024 * 1024), "1.0G");
        assert_eq!(format_bytes(1024 * 1024 * 1024 * 1024), "1.0T");
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(1024.0), "1.0K/s");
        assert_eq!(format_rate(1024.0 * 1024.0), "1.0M/s");
        assert_eq!(format_rate(-5.0), "0 B/s");
    }

    #[test]
    fn test_format_ops_per_second() {
        assert_eq!(format_ops_per_second(1000.0), "1000.0/s");
        assert_eq!(format_ops_per_second(12.34), "12.3/s");
    }

    #[test]
    fn test_format_latency_ms() {
        assert_eq!(format_latency_ms(0.0021), "2.10ms");
        assert_eq!(format_latency_ms(0.5), "500.00ms");
    }

    #[test]
    fn test_format_percent_and_count() {
        assert_eq!(format_percent(200.0 / 3.0), "66.67%");
        assert_eq!(format_count(3.0), "3");
    }
}
