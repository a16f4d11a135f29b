//! Human-readable durations such as `"6h"` or `"30m"`.

use serde::{Deserialize, Deserializer};

/// Parse interval string like "1h", "30m", "6h", "1d" into seconds
pub fn parse_interval(s: &str) -> Result<u64, String> {
    let s = s.trim().to_lowercase();

    if let Some(hours) = s.strip_suffix('h') {
        hours
            .parse::<u64>()
            .ok()
            .and_then(|h| h.checked_mul(3600))
            .ok_or_else(|| format!("Invalid hours: {}", hours))
    } else if let Some(minutes) = s.strip_suffix('m') {
        minutes
            .parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .ok_or_else(|| format!("Invalid minutes: {}", minutes))
    } else if let Some(days) = s.strip_suffix('d') {
        days.parse::<u64>()
            .ok()
            .and_then(|d| d.checked_mul(86400))
            .ok_or_else(|| format!("Invalid days: {}", days))
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.parse::<u64>()
            .map_err(|_| format!("Invalid seconds: {}", secs))
    } else {
        s.parse::<u64>()
            .map_err(|_| format!("Invalid interval: {}. Use format like '1h', '30m', '1d'", s))
    }
}

/// Format interval for display
pub fn format_interval(secs: u64) -> String {
    if secs >= 86400 && secs % 86400 == 0 {
        format!("{}d", secs / 86400)
    } else if secs >= 3600 && secs % 3600 == 0 {
        format!("{}h", secs / 3600)
    } else if secs >= 60 && secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}

/// Accepts either a number of seconds or an interval string.
pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Secs(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Secs(secs) => Ok(secs),
        Raw::Text(text) => parse_interval(&text).map_err(serde::de::Error::custom),
    }
}
