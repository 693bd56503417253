//! Human-readable byte sizes.

const KB: u64 = 1024;
const MB: u64 = KB * 1024;

/// Format a byte count as `"<value> <unit>"`.
///
/// Units are Bytes, KB and MB (1024-based). Values are rounded to two
/// decimals with trailing zeros dropped, so 1536 renders as `"1.5 KB"`.
/// Sizes beyond a megabyte stay in MB.
///
/// ```
/// use leadform::format_bytes;
///
/// assert_eq!(format_bytes(0), "0 Bytes");
/// assert_eq!(format_bytes(1536), "1.5 KB");
/// assert_eq!(format_bytes(5 * 1024 * 1024), "5 MB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let (value, unit) = if bytes >= MB {
        (bytes as f64 / MB as f64, "MB")
    } else if bytes >= KB {
        (bytes as f64 / KB as f64, "KB")
    } else {
        return format!("{bytes} Bytes");
    };

    format!("{} {unit}", trim_decimals(value))
}

fn trim_decimals(value: f64) -> String {
    let fixed = format!("{value:.2}");
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}
