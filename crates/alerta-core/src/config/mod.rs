//! Feed configuration shared by Alerta clients.
//!
//! Clients resolve the incident feed address from, in order: an explicit
//! value (command-line flag), the `ALERTA_WEBSOCKET_URL` environment
//! variable, a saved config file, and finally the public echo server.

use serde::{Deserialize, Serialize};

use crate::sync::ReconnectPolicy;
use crate::util::{is_secure_feed_url, normalize_text_option};

pub const WEBSOCKET_URL_ENV: &str = "ALERTA_WEBSOCKET_URL";
pub const DATA_DIR_ENV: &str = "ALERTA_DATA_DIR";
pub const DEFAULT_WEBSOCKET_URL: &str = "wss://echo.websocket.org";

/// Where the resolved feed address came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedUrlSource {
    Explicit,
    Environment,
    ConfigFile,
    Default,
}

impl FeedUrlSource {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Explicit => "command line",
            Self::Environment => WEBSOCKET_URL_ENV,
            Self::ConfigFile => "config file",
            Self::Default => "default",
        }
    }
}

/// Client-side feed settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FeedConfig {
    #[serde(default)]
    pub websocket_url: Option<String>,
    /// Reconnect-with-backoff after a dropped connection. Off unless set.
    #[serde(default)]
    pub reconnect: Option<ReconnectPolicy>,
}

impl FeedConfig {
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.websocket_url = normalize_text_option(self.websocket_url);
        self
    }

    /// Whether the configured address would actually be dialed.
    pub fn has_secure_url(&self) -> bool {
        self.websocket_url
            .as_deref()
            .is_some_and(is_secure_feed_url)
    }
}

/// Pick the feed address by precedence. Blank values are skipped.
///
/// The result is not validated: an insecure address is returned as-is and
/// the synchronizer treats it as demo mode.
pub fn resolve_feed_url(
    explicit: Option<&str>,
    environment: Option<&str>,
    config_file: Option<&str>,
) -> (String, FeedUrlSource) {
    let candidates = [
        (explicit, FeedUrlSource::Explicit),
        (environment, FeedUrlSource::Environment),
        (config_file, FeedUrlSource::ConfigFile),
    ];

    candidates
        .into_iter()
        .find_map(|(value, source)| {
            normalize_text_option(value.map(str::to_string)).map(|value| (value, source))
        })
        .unwrap_or_else(|| (DEFAULT_WEBSOCKET_URL.to_string(), FeedUrlSource::Default))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn explicit_value_wins() {
        let (url, source) = resolve_feed_url(
            Some("wss://flag.test"),
            Some("wss://env.test"),
            Some("wss://file.test"),
        );
        assert_eq!(url, "wss://flag.test");
        assert_eq!(source, FeedUrlSource::Explicit);
    }

    #[test]
    fn environment_beats_config_file() {
        let (url, source) =
            resolve_feed_url(None, Some("wss://env.test"), Some("wss://file.test"));
        assert_eq!(url, "wss://env.test");
        assert_eq!(source, FeedUrlSource::Environment);
    }

    #[test]
    fn blank_values_fall_through_to_default() {
        let (url, source) = resolve_feed_url(Some("  "), Some(""), None);
        assert_eq!(url, DEFAULT_WEBSOCKET_URL);
        assert_eq!(source, FeedUrlSource::Default);
    }

    #[test]
    fn insecure_values_are_kept_for_demo_mode() {
        let (url, source) = resolve_feed_url(None, None, Some(" http://insecure "));
        assert_eq!(url, "http://insecure");
        assert_eq!(source, FeedUrlSource::ConfigFile);
    }

    #[test]
    fn feed_config_parses_with_reconnect_policy() {
        let config: FeedConfig = serde_json::from_str(
            r#"{"websocket_url":" wss://feed.test ","reconnect":{"max_attempts":3,"initial_delay_ms":100,"max_delay_ms":1000}}"#,
        )
        .unwrap();
        let config = config.normalized();

        assert_eq!(config.websocket_url.as_deref(), Some("wss://feed.test"));
        assert_eq!(config.reconnect.map(|policy| policy.max_attempts), Some(3));
        assert!(config.has_secure_url());
    }

    #[test]
    fn feed_config_rejects_unknown_fields() {
        assert!(serde_json::from_str::<FeedConfig>(r#"{"feed":"x"}"#).is_err());
    }

    #[test]
    fn empty_feed_config_has_no_secure_url() {
        assert!(!FeedConfig::default().has_secure_url());
        let insecure = FeedConfig {
            websocket_url: Some("ws://feed.test".to_string()),
            reconnect: None,
        };
        assert!(!insecure.has_secure_url());
    }
}
