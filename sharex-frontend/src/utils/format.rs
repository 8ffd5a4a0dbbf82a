//! Display helpers for sizes and timestamps.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// `0 Bytes`, `512 Bytes`, `1.5 KB`, `2.25 MB`. Two decimals at most,
/// trailing zeros dropped, GB is the largest unit.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let exponent = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let exponent = exponent.min(SIZE_UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exponent as i32);

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZE_UNITS[exponent])
}

/// Compact size for the upload form's maximum-size hint: whole numbers with
/// B/KB/MB/GB.
pub fn pretty_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{} {}", value.round() as u64, UNITS[unit])
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// `Dec 24, 2026`; unparseable input is shown unchanged.
pub fn format_date(raw: &str) -> String {
    parse_timestamp(raw.trim())
        .map(|dt| dt.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// `Dec 24, 2026, 18:30`; unparseable input is shown unchanged.
pub fn format_date_time(raw: &str) -> String {
    parse_timestamp(raw.trim())
        .map(|dt| dt.format("%b %-d, %Y, %H:%M").to_string())
        .unwrap_or_else(|| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_sizes() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3 GB");
        assert_eq!(format_file_size(2048 * 1024 * 1024 * 1024), "2048 GB");
    }

    #[test]
    fn pretty_sizes() {
        assert_eq!(pretty_size(800), "800 B");
        assert_eq!(pretty_size(1536), "2 KB");
        assert_eq!(pretty_size(100 * 1024 * 1024), "100 MB");
    }

    #[test]
    fn dates() {
        assert_eq!(format_date("2026-12-24T18:30:00"), "Dec 24, 2026");
        assert_eq!(format_date_time("2026-12-24T18:30:00.123"), "Dec 24, 2026, 18:30");
        assert_eq!(format_date_time("2026-12-24T18:30:00Z"), "Dec 24, 2026, 18:30");
        assert_eq!(format_date("soon"), "soon");
    }
}
