//! In-process transport used by synchronizer tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use super::protocol::FeedFrame;
use super::transport::{FeedChannel, FeedTransport, TransportError, TransportResult};

/// The remote end of one scripted connection.
pub struct ServerEnd {
    pub address: String,
    pub to_client: mpsc::UnboundedSender<FeedFrame>,
    pub from_client: mpsc::UnboundedReceiver<String>,
}

#[derive(Clone)]
pub struct ScriptedTransport {
    accepted: mpsc::UnboundedSender<ServerEnd>,
    refuse: Arc<AtomicBool>,
    opened: Arc<AtomicUsize>,
}

impl ScriptedTransport {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ServerEnd>) {
        let (accepted, servers) = mpsc::unbounded_channel();
        (
            Self {
                accepted,
                refuse: Arc::new(AtomicBool::new(false)),
                opened: Arc::new(AtomicUsize::new(0)),
            },
            servers,
        )
    }

    pub fn refuse_handshakes(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

impl FeedTransport for ScriptedTransport {
    async fn open(&self, address: &str) -> TransportResult<FeedChannel> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        if self.refuse.load(Ordering::SeqCst) {
            return Err(TransportError::Handshake("connection refused".to_string()));
        }

        let (to_client, inbound) = mpsc::unbounded_channel();
        let (outbound, from_client) = mpsc::unbounded_channel();
        let _ = self.accepted.send(ServerEnd {
            address: address.to_string(),
            to_client,
            from_client,
        });

        Ok(FeedChannel {
            inbound,
            outbound,
            writer: None,
        })
    }
}
