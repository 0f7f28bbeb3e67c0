//! Live mirror of the server-side incident feed.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::collection::{IncidentCollection, UpsertOutcome};
use super::protocol::{decode_frame, encode_notify, FeedFrame, IgnoreReason};
use super::reconnect::ReconnectPolicy;
use super::transport::{FeedChannel, FeedTransport, WsTransport};
use crate::models::{Incident, IncidentDraft, IncidentId};
use crate::state::ConnectionState;
use crate::util::is_secure_feed_url;

const FLUSH_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// Empty or non-`wss://` address: demo mode, nothing opened
    Skipped,
    /// A connection to this address is already live or being established
    AlreadyActive,
    Started,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Sent(IncidentId),
    /// Not connected; nothing was transmitted or queued
    NotSent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Applied(UpsertOutcome),
    Ignored(IgnoreReason),
}

struct SharedState {
    generation: AtomicU64,
    /// Set with every `Disconnected` state: whether a reconnect attempt follows.
    retrying: AtomicBool,
    connection: watch::Sender<ConnectionState>,
    incidents: watch::Sender<IncidentCollection>,
}

impl SharedState {
    fn new() -> Self {
        let (connection, _) = watch::channel(ConnectionState::Disconnected);
        let (incidents, _) = watch::channel(IncidentCollection::new());
        Self {
            generation: AtomicU64::new(0),
            retrying: AtomicBool::new(false),
            connection,
            incidents,
        }
    }

    /// Invalidate every running connection task and move to `state`.
    ///
    /// Runs under the watch lock so a superseded task can never interleave
    /// its own state change.
    fn next_generation(&self, state: ConnectionState) -> u64 {
        let mut generation = 0;
        self.connection.send_if_modified(|current| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            self.retrying.store(false, Ordering::SeqCst);
            let changed = *current != state;
            *current = state;
            changed
        });
        generation
    }

    /// Returns false when `generation` has been superseded.
    fn set_connection(&self, generation: u64, state: ConnectionState) -> bool {
        let mut current_generation = true;
        self.connection.send_if_modified(|current| {
            if self.generation.load(Ordering::SeqCst) != generation {
                current_generation = false;
                return false;
            }
            let changed = *current != state;
            *current = state;
            changed
        });
        current_generation
    }

    /// Publish `Disconnected` together with whether a retry is scheduled, so
    /// an observer woken by the change reads the matching flag.
    fn set_disconnected(&self, generation: u64, retrying: bool) {
        self.connection.send_if_modified(|current| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            self.retrying.store(retrying, Ordering::SeqCst);
            let changed = *current != ConnectionState::Disconnected;
            *current = ConnectionState::Disconnected;
            changed
        });
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn apply_frame(&self, frame: &FeedFrame) -> FrameOutcome {
        match decode_frame(frame) {
            Ok(incident) => {
                let mut outcome = UpsertOutcome::Unchanged;
                self.incidents.send_if_modified(|collection| {
                    outcome = collection.upsert(incident);
                    outcome != UpsertOutcome::Unchanged
                });
                FrameOutcome::Applied(outcome)
            }
            Err(reason) => FrameOutcome::Ignored(reason),
        }
    }
}

struct ActiveConnection {
    address: String,
    outbox: mpsc::UnboundedSender<String>,
    task: JoinHandle<()>,
}

/// Owns at most one feed connection and the incident collection it feeds.
///
/// Observers subscribe to the collection and the connection state through
/// watch channels. Dropping the synchronizer tears the connection down.
pub struct IncidentSynchronizer<T: FeedTransport = WsTransport> {
    transport: Arc<T>,
    shared: Arc<SharedState>,
    reconnect: Option<ReconnectPolicy>,
    active: Option<ActiveConnection>,
}

impl IncidentSynchronizer<WsTransport> {
    pub fn websocket() -> Self {
        Self::new(WsTransport::new())
    }
}

impl<T: FeedTransport> IncidentSynchronizer<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
            shared: Arc::new(SharedState::new()),
            reconnect: None,
            active: None,
        }
    }

    /// Enable reconnect-with-backoff. Without a policy a dropped connection
    /// stays disconnected until `connect` is called again.
    #[must_use]
    pub fn with_reconnect(mut self, policy: Option<ReconnectPolicy>) -> Self {
        self.reconnect = policy;
        self
    }

    /// Point the synchronizer at `address`.
    ///
    /// Any connection to a different address is closed first. Must be called
    /// from within a Tokio runtime.
    pub fn connect(&mut self, address: &str) -> ConnectOutcome {
        let address = address.trim();

        if let Some(active) = &self.active {
            if active.address == address
                && !active.task.is_finished()
                && self.connection_state() != ConnectionState::Disconnected
            {
                return ConnectOutcome::AlreadyActive;
            }
        }
        self.stop_active();

        if !is_secure_feed_url(address) {
            if address.is_empty() {
                tracing::info!("Incident feed address not configured, running in demo mode");
            } else {
                tracing::info!(
                    "Incident feed address {} is not wss://, running in demo mode",
                    address
                );
            }
            return ConnectOutcome::Skipped;
        }

        let generation = self.shared.next_generation(ConnectionState::Connecting);
        let (outbox, outbox_rx) = mpsc::unbounded_channel();
        tracing::info!("Connecting to incident feed {}", address);
        let task = tokio::spawn(run_connection(
            Arc::clone(&self.transport),
            Arc::clone(&self.shared),
            address.to_string(),
            outbox_rx,
            generation,
            self.reconnect,
        ));

        self.active = Some(ActiveConnection {
            address: address.to_string(),
            outbox,
            task,
        });
        ConnectOutcome::Started
    }

    /// Drop the connection immediately, discarding unsent frames.
    pub fn disconnect(&mut self) {
        if self.active.is_some() {
            tracing::info!("Disconnecting from incident feed");
        }
        self.stop_active();
    }

    /// Close the connection after queued frames have been written.
    pub async fn close(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };

        let ActiveConnection {
            outbox, mut task, ..
        } = active;
        drop(outbox);
        if tokio::time::timeout(FLUSH_GRACE * 2, &mut task)
            .await
            .is_err()
        {
            tracing::warn!("Incident feed did not close in time, aborting");
            task.abort();
        }
        self.shared.next_generation(ConnectionState::Disconnected);
    }

    /// Process one inbound frame as if it arrived on the connection.
    pub fn handle_frame(&self, frame: &FeedFrame) -> FrameOutcome {
        self.shared.apply_frame(frame)
    }

    /// Send `draft` with a freshly generated id while connected.
    ///
    /// There is no optimistic insert: the incident shows up in the
    /// collection only when the feed echoes it back as an update.
    pub fn submit_incident(&self, draft: IncidentDraft) -> SubmitOutcome {
        let Some(active) = self.active.as_ref().filter(|_| self.is_connected()) else {
            tracing::debug!("Not connected, incident not submitted");
            return SubmitOutcome::NotSent;
        };

        let incident_id = IncidentId::generate();
        let incident = Incident::from_draft(draft, incident_id.clone());
        let payload = match encode_notify(&incident) {
            Ok(payload) => payload,
            Err(error) => {
                tracing::error!("Failed to encode incident {}: {}", incident_id, error);
                return SubmitOutcome::NotSent;
            }
        };

        if active.outbox.send(payload).is_err() {
            tracing::warn!("Incident feed connection ended, incident not submitted");
            return SubmitOutcome::NotSent;
        }
        tracing::info!("Submitted incident {}", incident_id);
        SubmitOutcome::Sent(incident_id)
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.shared.connection.borrow()
    }

    /// The connectivity flag.
    pub fn is_connected(&self) -> bool {
        self.connection_state().is_connected()
    }

    /// True while disconnected with a reconnect attempt still scheduled.
    ///
    /// Once the reconnect policy is exhausted (or when there is none) a
    /// `Disconnected` state is final until `connect` is called again.
    pub fn is_retrying(&self) -> bool {
        let state = self.shared.connection.borrow();
        *state == ConnectionState::Disconnected && self.shared.retrying.load(Ordering::SeqCst)
    }

    /// True when disconnected with nothing scheduled: before the first
    /// `connect`, after `disconnect`, or once reconnecting has given up.
    ///
    /// Unlike `!is_retrying()` this stays false while a retry is already
    /// back in `Connecting`.
    pub fn is_stopped(&self) -> bool {
        let state = self.shared.connection.borrow();
        *state == ConnectionState::Disconnected && !self.shared.retrying.load(Ordering::SeqCst)
    }

    pub fn address(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.address.as_str())
    }

    /// Snapshot of the current collection.
    pub fn incidents(&self) -> IncidentCollection {
        self.shared.incidents.borrow().clone()
    }

    pub fn subscribe_incidents(&self) -> watch::Receiver<IncidentCollection> {
        self.shared.incidents.subscribe()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.shared.connection.subscribe()
    }

    fn stop_active(&mut self) {
        if let Some(active) = self.active.take() {
            active.task.abort();
            self.shared.next_generation(ConnectionState::Disconnected);
        }
    }
}

impl<T: FeedTransport> Drop for IncidentSynchronizer<T> {
    fn drop(&mut self) {
        self.stop_active();
    }
}

enum SessionEnd {
    ClosedLocally,
    ClosedRemotely,
}

enum PumpEvent {
    Inbound(Option<FeedFrame>),
    Outbound(Option<String>),
}

async fn run_connection<T: FeedTransport>(
    transport: Arc<T>,
    shared: Arc<SharedState>,
    address: String,
    mut outbox: mpsc::UnboundedReceiver<String>,
    generation: u64,
    reconnect: Option<ReconnectPolicy>,
) {
    let mut attempt = 0_u32;

    loop {
        if !shared.set_connection(generation, ConnectionState::Connecting) {
            return;
        }

        match transport.open(&address).await {
            Ok(channel) => {
                if !shared.set_connection(generation, ConnectionState::Connected) {
                    return;
                }
                tracing::info!("Connected to incident feed {}", address);
                attempt = 0;

                let end = pump(channel, &shared, &mut outbox, generation).await;
                if matches!(end, SessionEnd::ClosedLocally) {
                    shared.set_disconnected(generation, false);
                    tracing::info!("Disconnected from incident feed");
                    return;
                }
                tracing::info!("Incident feed closed by remote");
            }
            Err(error) => {
                tracing::error!("Failed to connect to incident feed {}: {}", address, error);
            }
        }

        let delay = reconnect.and_then(|policy| policy.delay_for(attempt));
        shared.set_disconnected(generation, delay.is_some());
        let Some(delay) = delay else {
            if reconnect.is_some() {
                tracing::warn!(
                    "Giving up on incident feed {} after {} reconnect attempt(s)",
                    address,
                    attempt
                );
            }
            return;
        };
        attempt += 1;
        discard_stale(&mut outbox);
        tracing::info!(
            "Reconnecting to incident feed in {} ms (attempt {})",
            delay.as_millis(),
            attempt
        );
        tokio::time::sleep(delay).await;
    }
}

async fn pump(
    mut channel: FeedChannel,
    shared: &SharedState,
    outbox: &mut mpsc::UnboundedReceiver<String>,
    generation: u64,
) -> SessionEnd {
    loop {
        let event = tokio::select! {
            frame = channel.inbound.recv() => PumpEvent::Inbound(frame),
            payload = outbox.recv() => PumpEvent::Outbound(payload),
        };

        match event {
            PumpEvent::Inbound(None | Some(FeedFrame::Close)) => return SessionEnd::ClosedRemotely,
            PumpEvent::Inbound(Some(frame)) => {
                if shared.is_current(generation) {
                    shared.apply_frame(&frame);
                }
            }
            PumpEvent::Outbound(Some(payload)) => {
                if channel.outbound.send(payload).is_err() {
                    return SessionEnd::ClosedRemotely;
                }
            }
            PumpEvent::Outbound(None) => {
                drop(channel.outbound);
                if let Some(writer) = channel.writer.take() {
                    if tokio::time::timeout(FLUSH_GRACE, writer).await.is_err() {
                        tracing::warn!("Timed out flushing incident feed");
                    }
                }
                return SessionEnd::ClosedLocally;
            }
        }
    }
}

fn discard_stale(outbox: &mut mpsc::UnboundedReceiver<String>) {
    let mut discarded = 0_usize;
    while outbox.try_recv().is_ok() {
        discarded += 1;
    }
    if discarded > 0 {
        tracing::warn!(
            "Discarded {} incident frame(s) queued for a closed connection",
            discarded
        );
    }
}
