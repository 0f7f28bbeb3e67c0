//! Shared utility functions used across multiple modules.

/// Normalize optional text by trimming whitespace and removing empties.
///
/// Returns `None` when the input is `None` or the trimmed value is empty.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Check if a string is a secure WebSocket address (`wss://`).
///
/// Plaintext `ws://` targets are rejected.
pub fn is_secure_feed_url(value: &str) -> bool {
    value
        .strip_prefix("wss://")
        .is_some_and(|rest| !rest.trim().is_empty())
}

/// Truncate text to at most `max_chars` characters for log previews.
pub fn compact_text(value: &str, max_chars: usize) -> String {
    value.trim().chars().take(max_chars).collect()
}

/// Current time as an RFC 3339 UTC timestamp with millisecond precision.
pub fn iso_timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_text_option_rejects_empty() {
        assert_eq!(normalize_text_option(None), None);
        assert_eq!(normalize_text_option(Some("   ".to_string())), None);
    }

    #[test]
    fn normalize_text_option_trims_value() {
        assert_eq!(
            normalize_text_option(Some(" wss://feed.example.edu ".to_string())),
            Some("wss://feed.example.edu".to_string())
        );
    }

    #[test]
    fn is_secure_feed_url_accepts_only_wss() {
        assert!(is_secure_feed_url("wss://feed.example.edu/incidents"));
        assert!(!is_secure_feed_url("ws://feed.example.edu"));
        assert!(!is_secure_feed_url("http://insecure"));
        assert!(!is_secure_feed_url("https://feed.example.edu"));
        assert!(!is_secure_feed_url("wss://"));
        assert!(!is_secure_feed_url(""));
    }

    #[test]
    fn compact_text_truncates() {
        assert_eq!(compact_text("  keepalive frame  ", 4), "keep");
    }

    #[test]
    fn iso_timestamp_now_is_parseable() {
        let now = iso_timestamp_now();
        assert!(chrono::DateTime::parse_from_rfc3339(&now).is_ok());
        assert!(now.ends_with('Z'));
    }
}
