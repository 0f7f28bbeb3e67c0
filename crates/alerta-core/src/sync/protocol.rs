//! Wire protocol for the incident feed.
//!
//! Inbound: `{"type":"incident_update","incident":{...}}` text frames.
//! Outbound: `{"action":"notify","incident":{...}}`.

use serde::Serialize;
use serde_json::Value;

use crate::models::Incident;
use crate::util::compact_text;

pub const INCIDENT_UPDATE_TYPE: &str = "incident_update";
pub const NOTIFY_ACTION: &str = "notify";

const LOG_PREVIEW_CHARS: usize = 50;

/// A frame as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedFrame {
    Text(String),
    Binary(Vec<u8>),
    Ping,
    Pong,
    Close,
}

/// Why an inbound frame did not produce an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NonText,
    NotJson,
    NotAnUpdate,
    InvalidIncident,
}

/// Decode an incident update, or say why the frame carries none.
///
/// Keepalives and other protocol noise are expected on the feed, so nothing
/// here is an error.
pub fn decode_frame(frame: &FeedFrame) -> Result<Incident, IgnoreReason> {
    let FeedFrame::Text(text) = frame else {
        tracing::debug!("Ignoring non-text frame");
        return Err(IgnoreReason::NonText);
    };

    let value = serde_json::from_str::<Value>(text).map_err(|_| {
        tracing::debug!(
            "Ignoring non-JSON frame: {}",
            compact_text(text, LOG_PREVIEW_CHARS)
        );
        IgnoreReason::NotJson
    })?;

    let Value::Object(mut message) = value else {
        return Err(IgnoreReason::NotAnUpdate);
    };
    if message.get("type").and_then(Value::as_str) != Some(INCIDENT_UPDATE_TYPE) {
        return Err(IgnoreReason::NotAnUpdate);
    }
    let incident = match message.remove("incident") {
        None | Some(Value::Null) => return Err(IgnoreReason::NotAnUpdate),
        Some(incident) => incident,
    };

    serde_json::from_value::<Incident>(incident).map_err(|error| {
        tracing::warn!("Ignoring undecodable incident update: {}", error);
        IgnoreReason::InvalidIncident
    })
}

#[derive(Serialize)]
struct NotifyEnvelope<'a> {
    action: &'static str,
    incident: &'a Incident,
}

/// Encode the `notify` envelope for a submitted incident.
pub fn encode_notify(incident: &Incident) -> serde_json::Result<String> {
    serde_json::to_string(&NotifyEnvelope {
        action: NOTIFY_ACTION,
        incident,
    })
}
