// Display formatting for counters, rankings and timestamps

use chrono::Local;
use phishscope_client::model::{parse_timestamp, OrderedMap};

/// Compact magnitude: 1,234,567 -> "1.2M", 1,234 -> "1.2K", smaller counts
/// are printed in full with thousands separators.
pub fn format_magnitude(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        format_thousands(n)
    }
}

pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// The `limit` highest counts, descending. Equal counts keep their original
/// key order.
pub fn top_categories(categories: &OrderedMap<u64>, limit: usize) -> Vec<(&str, u64)> {
    let mut ranked: Vec<(&str, u64)> = categories.iter().map(|(k, v)| (k, *v)).collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(limit);
    ranked
}

/// Long date for certificate bounds, e.g. "Jan 20, 2024, 14:30"; "N/A" when
/// absent or unparseable.
pub fn format_date(raw: Option<&str>) -> String {
    raw.and_then(parse_timestamp)
        .map(|dt| dt.with_timezone(&Local).format("%b %-d, %Y, %H:%M").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Short timestamp for result rows, e.g. "Jan 20, 14:30". Unparseable input
/// is shown as-is.
pub fn format_short_timestamp(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|dt| dt.with_timezone(&Local).format("%b %-d, %H:%M").to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Shortens `text` to at most `max` characters, marking the cut with '…'.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
