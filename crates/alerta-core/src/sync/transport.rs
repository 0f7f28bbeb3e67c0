//! Transport seam for the incident feed and its WebSocket implementation.

use std::future::Future;

use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

use super::protocol::FeedFrame;
use crate::util::is_secure_feed_url;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Feed address must use wss://: {0}")]
    InsecureAddress(String),
    #[error("WebSocket handshake failed: {0}")]
    Handshake(String),
}

pub type TransportResult<T> = Result<T, TransportError>;

/// An open feed connection, seen as two channels.
///
/// The inbound receiver ends when the remote side goes away. Dropping the
/// outbound sender closes the connection once queued frames are written;
/// `writer`, when present, completes at that point.
pub struct FeedChannel {
    pub inbound: mpsc::UnboundedReceiver<FeedFrame>,
    pub outbound: mpsc::UnboundedSender<String>,
    pub writer: Option<JoinHandle<()>>,
}

pub trait FeedTransport: Send + Sync + 'static {
    fn open(&self, address: &str) -> impl Future<Output = TransportResult<FeedChannel>> + Send;
}

/// `wss://` transport backed by `tokio-tungstenite` and rustls.
#[derive(Debug, Clone, Copy)]
pub struct WsTransport;

impl WsTransport {
    pub fn new() -> Self {
        // Fails only when the host already installed a provider.
        let _ = rustls::crypto::ring::default_provider().install_default();
        Self
    }
}

impl Default for WsTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedTransport for WsTransport {
    async fn open(&self, address: &str) -> TransportResult<FeedChannel> {
        if !is_secure_feed_url(address) {
            return Err(TransportError::InsecureAddress(address.to_string()));
        }

        let (stream, _response) = tokio_tungstenite::connect_async(address)
            .await
            .map_err(|error| TransportError::Handshake(error.to_string()))?;
        let (mut sink, mut source) = stream.split();

        let (inbound_tx, inbound) = mpsc::unbounded_channel();
        let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<String>();

        let writer = tokio::spawn(async move {
            while let Some(payload) = outbound_rx.recv().await {
                if let Err(error) = sink.send(Message::text(payload)).await {
                    tracing::error!("Failed to write to incident feed: {}", error);
                    break;
                }
            }
            if let Err(error) = sink.close().await {
                tracing::debug!("Incident feed close handshake failed: {}", error);
            }
        });

        tokio::spawn(async move {
            while let Some(message) = source.next().await {
                let frame = match message {
                    Ok(Message::Text(text)) => FeedFrame::Text(text.to_string()),
                    Ok(Message::Binary(bytes)) => FeedFrame::Binary(bytes.to_vec()),
                    Ok(Message::Ping(_)) => FeedFrame::Ping,
                    Ok(Message::Pong(_)) => FeedFrame::Pong,
                    Ok(Message::Close(_)) => FeedFrame::Close,
                    Ok(Message::Frame(_)) => continue,
                    Err(error) => {
                        tracing::error!("Incident feed connection error: {}", error);
                        break;
                    }
                };
                let closing = frame == FeedFrame::Close;
                if inbound_tx.send(frame).is_err() || closing {
                    break;
                }
            }
        });

        Ok(FeedChannel {
            inbound,
            outbound,
            writer: Some(writer),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ws_transport_rejects_plaintext_addresses() {
        let transport = WsTransport::new();
        let result = transport.open("ws://feed.example.edu").await;
        assert!(matches!(result, Err(TransportError::InsecureAddress(_))));
    }
}
