//! Human-readable formatting for durations, view counts and byte sizes,
//! plus the lenient number parsing the metadata sources need.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Shown when a duration is missing or zero
pub const UNKNOWN_DURATION: &str = "00:00";

/// Shown when a size cannot be estimated
pub const UNKNOWN_SIZE: &str = "Unknown";

const BYTE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Format seconds as `H:MM:SS` or `M:SS`.
pub fn format_duration(seconds: u64) -> String {
    if seconds == 0 {
        return UNKNOWN_DURATION.to_string();
    }

    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// Format a view count with K/M/B suffixes.
pub fn format_view_count(count: u64) -> String {
    if count >= 1_000_000_000 {
        format!("{:.1}B", count as f64 / 1_000_000_000.0)
    } else if count >= 1_000_000 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}K", count as f64 / 1_000.0)
    } else {
        count.to_string()
    }
}

/// Format a byte count in binary units with one decimal place, e.g. `2.5 GB`.
pub fn format_bytes(bytes: f64) -> String {
    if bytes <= 0.0 || !bytes.is_finite() {
        return "0 B".to_string();
    }

    let exponent = (bytes.ln() / 1024f64.ln()).floor();
    let index = exponent.clamp(0.0, (BYTE_UNITS.len() - 1) as f64) as usize;
    let scaled = bytes / 1024f64.powi(index as i32);
    let rounded = (scaled * 10.0).round() / 10.0;

    format!("{} {}", rounded, BYTE_UNITS[index])
}

/// Raw byte size of a stream from its bitrate (bits/s) and duration (s).
pub fn estimate_bytes(bitrate: u64, duration_secs: u64) -> Option<u64> {
    if bitrate == 0 || duration_secs == 0 {
        return None;
    }
    Some(((bitrate as f64 * duration_secs as f64) / 8.0).round() as u64)
}

/// Human-readable size estimate, or `Unknown` when either input is missing.
pub fn estimate_file_size(bitrate: u64, duration_secs: u64) -> String {
    match estimate_bytes(bitrate, duration_secs) {
        Some(bytes) => format_bytes(bytes as f64),
        None => UNKNOWN_SIZE.to_string(),
    }
}

/// Leading integer of a string after optional whitespace and sign,
/// `None` when no digits lead. `"1080p"` gives 1080 and `"4K (2160p)"` gives 4.
pub fn leading_integer(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits: &str = {
        let end = rest
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        &rest[..end]
    };

    if digits.is_empty() {
        return None;
    }

    let value = digits.parse::<i64>().ok()?;
    Some(if negative { -value } else { value })
}

/// Interpret a JSON value that may be a number or a numeric string.
pub fn lenient_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f.floor() as u64)),
        Value::String(s) => leading_integer(s).filter(|v| *v >= 0).map(|v| v as u64),
        _ => None,
    }
}

/// Serde adapter for fields that arrive as numbers or strings.
pub fn deserialize_lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(lenient_u64))
}

/// Serde adapter for list fields: `null` or a non-array becomes an empty
/// list, and entries that fail to decode are skipped.
pub fn deserialize_lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ============================================================
    // DURATION
    // ============================================================

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(45), "0:45");
        assert_eq!(format_duration(125), "2:05");
        assert_eq!(format_duration(3725), "1:02:05");
        assert_eq!(format_duration(0), "00:00");
    }

    #[test]
    fn test_format_duration_exact_hour() {
        assert_eq!(format_duration(3600), "1:00:00");
        assert_eq!(format_duration(36_000 + 61), "10:01:01");
    }

    // ============================================================
    // VIEW COUNT
    // ============================================================

    #[test]
    fn test_format_view_count() {
        assert_eq!(format_view_count(950), "950");
        assert_eq!(format_view_count(1500), "1.5K");
        assert_eq!(format_view_count(2_300_000), "2.3M");
        assert_eq!(format_view_count(1_000_000_000), "1.0B");
    }

    #[test]
    fn test_format_view_count_boundaries() {
        assert_eq!(format_view_count(0), "0");
        assert_eq!(format_view_count(999), "999");
        assert_eq!(format_view_count(1000), "1.0K");
        assert_eq!(format_view_count(1_000_000), "1.0M");
    }

    // ============================================================
    // BYTE SIZES
    // ============================================================

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0.0), "0 B");
        assert_eq!(format_bytes(512.0), "512 B");
        assert_eq!(format_bytes(1536.0), "1.5 KB");
        assert_eq!(format_bytes(891_289_600.0), "850 MB");
        assert_eq!(format_bytes(2_684_354_560.0), "2.5 GB");
    }

    #[test]
    fn test_format_bytes_caps_at_gigabytes() {
        assert_eq!(format_bytes(2.0 * 1024f64.powi(4)), "2048 GB");
    }

    #[test]
    fn test_estimate_file_size() {
        // 8 Mbit/s for 100 s is 100 MB (decimal) which is 95.4 MiB
        assert_eq!(estimate_file_size(8_000_000, 100), "95.4 MB");
        assert_eq!(estimate_file_size(0, 100), UNKNOWN_SIZE);
        assert_eq!(estimate_file_size(128_000, 0), UNKNOWN_SIZE);
        assert_eq!(estimate_bytes(128_000, 60), Some(960_000));
    }

    // ============================================================
    // LENIENT PARSING
    // ============================================================

    #[test]
    fn test_leading_integer() {
        assert_eq!(leading_integer("720p"), Some(720));
        assert_eq!(leading_integer("4K (2160p)"), Some(4));
        assert_eq!(leading_integer("128kbps"), Some(128));
        assert_eq!(leading_integer("  42"), Some(42));
        assert_eq!(leading_integer("-7s"), Some(-7));
        assert_eq!(leading_integer("hd"), None);
        assert_eq!(leading_integer(""), None);
    }

    #[test]
    fn test_lenient_u64() {
        assert_eq!(lenient_u64(&json!(125)), Some(125));
        assert_eq!(lenient_u64(&json!(125.9)), Some(125));
        assert_eq!(lenient_u64(&json!("3725")), Some(3725));
        assert_eq!(lenient_u64(&json!("123abc")), Some(123));
        assert_eq!(lenient_u64(&json!("abc")), None);
        assert_eq!(lenient_u64(&json!(-5)), None);
        assert_eq!(lenient_u64(&json!(null)), None);
        assert_eq!(lenient_u64(&json!(true)), None);
    }

    #[test]
    fn test_deserialize_lenient_field() {
        #[derive(Deserialize)]
        struct Payload {
            #[serde(default, deserialize_with = "deserialize_lenient_u64")]
            views: Option<u64>,
        }

        let a: Payload = serde_json::from_value(json!({ "views": "1500" })).unwrap();
        let b: Payload = serde_json::from_value(json!({ "views": 1500 })).unwrap();
        let c: Payload = serde_json::from_value(json!({})).unwrap();
        let d: Payload = serde_json::from_value(json!({ "views": "n/a" })).unwrap();

        assert_eq!(a.views, Some(1500));
        assert_eq!(b.views, Some(1500));
        assert_eq!(c.views, None);
        assert_eq!(d.views, None);
    }

    // ============================================================
    // LENIENT LISTS
    // ============================================================

    #[derive(Debug, Deserialize)]
    struct Tagged {
        #[serde(default, deserialize_with = "deserialize_lenient_vec")]
        tags: Vec<String>,
    }

    #[test]
    fn test_lenient_vec_null_and_wrong_type() {
        let tagged: Tagged = serde_json::from_value(json!({ "tags": null })).unwrap();
        assert!(tagged.tags.is_empty());

        let tagged: Tagged = serde_json::from_value(json!({ "tags": "music" })).unwrap();
        assert!(tagged.tags.is_empty());

        let tagged: Tagged = serde_json::from_value(json!({})).unwrap();
        assert!(tagged.tags.is_empty());
    }

    #[test]
    fn test_lenient_vec_skips_bad_entries() {
        let tagged: Tagged =
            serde_json::from_value(json!({ "tags": ["pop", 7, null, "rock"] })).unwrap();
        assert_eq!(tagged.tags, vec!["pop", "rock"]);
    }
}
