use std::env;
use std::ffi::OsString;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use alerta_core::config::{resolve_feed_url, FeedUrlSource, DATA_DIR_ENV, WEBSOCKET_URL_ENV};
use alerta_core::session::FileSessionStore;
use alerta_core::sync::{ConnectOutcome, FeedTransport, IncidentStats};
use alerta_core::{
    ConnectionState, Incident, IncidentCollection, IncidentSynchronizer, SessionStore, User,
};
use chrono::Utc;
use serde::Serialize;

use crate::config::{default_config_path, default_data_dir, CliConfig};
use crate::error::CliError;

/// Everything a command needs, resolved once at startup.
pub struct AppContext {
    pub config_path: PathBuf,
    pub config: CliConfig,
    pub data_dir: PathBuf,
    pub feed_url: String,
    pub feed_source: FeedUrlSource,
    pub session: SessionStore<FileSessionStore>,
}

impl AppContext {
    pub fn load(data_dir: Option<PathBuf>, feed_url: Option<&str>) -> Result<Self, CliError> {
        let config_path = default_config_path()?;
        let config = CliConfig::load_from_path(&config_path)?;
        let data_dir = resolve_data_dir(data_dir, env::var_os(DATA_DIR_ENV))?;

        let env_feed_url = env::var(WEBSOCKET_URL_ENV).ok();
        let feed_config = config.feed_config();
        let (feed_url, feed_source) = resolve_feed_url(
            feed_url,
            env_feed_url.as_deref(),
            feed_config.websocket_url.as_deref(),
        );
        tracing::debug!(
            "Using incident feed {} (from {})",
            feed_url,
            feed_source.label()
        );

        let session = SessionStore::restore(FileSessionStore::in_dir(&data_dir));

        Ok(Self {
            config_path,
            config,
            data_dir,
            feed_url,
            feed_source,
            session,
        })
    }

    pub fn require_user(&self) -> Result<User, CliError> {
        self.session.current().ok_or(CliError::NotSignedIn)
    }

    pub fn synchronizer(&self) -> IncidentSynchronizer {
        IncidentSynchronizer::websocket().with_reconnect(self.config.reconnect)
    }

    pub const fn reconnects(&self) -> bool {
        self.config.reconnect.is_some()
    }
}

/// A change observed while following the feed.
pub enum FeedEvent<'a> {
    State(ConnectionState),
    Incidents(&'a IncidentCollection),
}

/// Why [`follow_feed`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowEnd {
    /// The address is not `wss://`; nothing was opened
    DemoMode,
    /// `stop` resolved
    Stopped,
    /// Disconnected with no retry left
    Disconnected,
}

/// Connect to `address` and hand every state and collection change to
/// `on_event` until `stop` resolves or the connection is lost for good.
///
/// Receivers are subscribed before connecting: a subscription taken after a
/// fast handshake failure would already count `Disconnected` as seen.
pub async fn follow_feed<T, S, F>(
    synchronizer: &mut IncidentSynchronizer<T>,
    address: &str,
    stop: S,
    mut on_event: F,
) -> Result<FollowEnd, CliError>
where
    T: FeedTransport,
    S: Future<Output = ()>,
    F: FnMut(FeedEvent<'_>) -> Result<(), CliError>,
{
    let mut states = synchronizer.subscribe_state();
    let mut incidents = synchronizer.subscribe_incidents();

    if synchronizer.connect(address) == ConnectOutcome::Skipped {
        return Ok(FollowEnd::DemoMode);
    }

    tokio::pin!(stop);
    let end = loop {
        tokio::select! {
            () = &mut stop => break FollowEnd::Stopped,
            changed = states.changed() => {
                if changed.is_err() {
                    break FollowEnd::Disconnected;
                }
                let state = *states.borrow_and_update();
                on_event(FeedEvent::State(state))?;
                if state == ConnectionState::Disconnected && synchronizer.is_stopped() {
                    break FollowEnd::Disconnected;
                }
            }
            changed = incidents.changed() => {
                if changed.is_err() {
                    break FollowEnd::Disconnected;
                }
                let current = incidents.borrow_and_update().clone();
                on_event(FeedEvent::Incidents(&current))?;
            }
        }
    };

    synchronizer.disconnect();
    Ok(end)
}

/// Why a live view stopped, when it was not the user's doing.
pub fn end_message(end: FollowEnd, address: &str, reconnects: bool) -> Option<String> {
    match end {
        FollowEnd::DemoMode => Some(format!(
            "Demo mode: {address} is not a wss:// address, no live updates."
        )),
        FollowEnd::Disconnected if reconnects => Some(format!(
            "Lost the incident feed at {address}; reconnect attempts exhausted."
        )),
        FollowEnd::Disconnected => Some(format!("Lost the incident feed at {address}.")),
        FollowEnd::Stopped => None,
    }
}

pub fn resolve_data_dir(
    cli_data_dir: Option<PathBuf>,
    env_data_dir: Option<OsString>,
) -> Result<PathBuf, CliError> {
    if let Some(dir) = cli_data_dir {
        return Ok(dir);
    }
    match env_data_dir.filter(|value| !value.is_empty()) {
        Some(dir) => Ok(PathBuf::from(dir)),
        None => default_data_dir(),
    }
}

/// Wait until the feed is connected or `limit` elapses.
///
/// A disconnect with no retry scheduled ends the wait early.
pub async fn wait_for_connection<T: FeedTransport>(
    synchronizer: &IncidentSynchronizer<T>,
    limit: Duration,
) -> bool {
    let mut states = synchronizer.subscribe_state();
    let waited = tokio::time::timeout(limit, async {
        loop {
            let state = *states.borrow_and_update();
            if state.is_connected() {
                return true;
            }
            if synchronizer.is_stopped() {
                return false;
            }
            if states.changed().await.is_err() {
                return false;
            }
        }
    })
    .await;

    waited.unwrap_or(false)
}

/// Resolves on Ctrl-C, or after `duration` when given.
pub async fn stop_signal(duration: Option<Duration>) {
    let interrupted = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {}", error);
            std::future::pending::<()>().await;
        }
    };

    match duration {
        Some(duration) => {
            tokio::select! {
                () = tokio::time::sleep(duration) => {}
                () = interrupted => {}
            }
        }
        None => interrupted.await,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentListItem {
    #[serde(flatten)]
    pub incident: Incident,
    pub relative_time: Option<String>,
}

pub fn incident_to_list_item(incident: &Incident) -> IncidentListItem {
    let now_ms = Utc::now().timestamp_millis();
    IncidentListItem {
        incident: incident.clone(),
        relative_time: incident
            .timestamp_utc()
            .map(|timestamp| format_relative_time(timestamp.timestamp_millis(), now_ms)),
    }
}

pub fn format_incident_line(incident: &Incident, now_ms: i64) -> String {
    let short_id = incident
        .incident_id
        .as_str()
        .chars()
        .take(13)
        .collect::<String>();
    let when = incident.timestamp_utc().map_or_else(
        || incident.timestamp.clone(),
        |timestamp| format_relative_time(timestamp.timestamp_millis(), now_ms),
    );
    let summary = preview(&format!("{}: {}", incident.location, incident.description), 48);

    format!(
        "{short_id:<13}  {:<11}  {:<6}  {:<14}  {summary:<48}  {when}",
        incident.status.as_str(),
        incident.urgency.as_str(),
        incident.kind.as_str(),
    )
}

pub fn format_incident_lines<'a>(incidents: impl IntoIterator<Item = &'a Incident>) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    incidents
        .into_iter()
        .map(|incident| format_incident_line(incident, now_ms))
        .collect()
}

pub fn format_stats_line(stats: IncidentStats) -> String {
    format!(
        "total={}  pending={}  in-progress={}  resolved={}",
        stats.total, stats.pending, stats.in_progress, stats.resolved
    )
}

pub fn format_connection_state(state: ConnectionState, address: &str) -> String {
    match state {
        ConnectionState::Connected => format!("* connected to {address}"),
        ConnectionState::Connecting => format!("~ connecting to {address}"),
        ConnectionState::Disconnected => "x disconnected".to_string(),
    }
}

pub fn preview(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}
