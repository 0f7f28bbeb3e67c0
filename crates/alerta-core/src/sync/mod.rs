//! Real-time incident synchronization.
//!
//! The synchronizer keeps one `wss://` feed connection open, folds
//! `incident_update` frames into an [`IncidentCollection`], and sends new
//! reports as `notify` frames while connected.

mod collection;
mod protocol;
mod reconnect;
mod synchronizer;
#[cfg(test)]
mod testing;
mod transport;

pub use collection::{IncidentCollection, IncidentStats, UpsertOutcome};
pub use protocol::{
    decode_frame, encode_notify, FeedFrame, IgnoreReason, INCIDENT_UPDATE_TYPE, NOTIFY_ACTION,
};
pub use reconnect::ReconnectPolicy;
pub use synchronizer::{ConnectOutcome, FrameOutcome, IncidentSynchronizer, SubmitOutcome};
pub use transport::{FeedChannel, FeedTransport, TransportError, TransportResult, WsTransport};
