use chrono::{DateTime, Local, TimeDelta, Utc};

const SIZE_UNITS: [&str; 8] = ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei", "Zi"];

/// Binary-prefixed size with one decimal, e.g. `1.0KiB`.
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in SIZE_UNITS {
        if size.abs() < 1024.0 {
            return format!("{size:3.1}{unit}B");
        }
        size /= 1024.0;
    }
    format!("{size:.1}YiB")
}

/// Days, hours and minutes that are non-zero, or `less than a minute`.
pub fn format_duration(delta: TimeDelta) -> String {
    let seconds = delta.num_seconds().max(0);
    let days = seconds / 86_400;
    let remainder = seconds % 86_400;
    let parts = [
        (days, "day"),
        (remainder / 3600, "hour"),
        (remainder / 60 % 60, "minute"),
    ];

    let text = parts
        .iter()
        .filter(|(value, _)| *value != 0)
        .map(|(value, unit)| {
            let plural = if *value > 1 { "s" } else { "" };
            format!("{value} {unit}{plural}")
        })
        .collect::<Vec<_>>()
        .join(" ");

    if text.is_empty() {
        "less than a minute".to_string()
    } else {
        text
    }
}

/// Local `dd.mm HH:MM`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%d.%m %H:%M").to_string()
}

/// Local date and time with seconds, used in log lines.
pub fn format_log_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
