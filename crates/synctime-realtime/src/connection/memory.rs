//! In-process transport.
//!
//! [`MemoryTransport::pair`] returns the client-side transport plus a
//! [`MemoryServer`] that accepts each connection as a [`MemoryPeer`], so the
//! full connect → auth → push → reconnect cycle runs without a socket.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::channel::mpsc as fmpsc;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::sync::{Mutex, mpsc};

use synctime_core::error::AppError;
use synctime_core::result::AppResult;

use super::transport::{Connection, Transport};
use crate::message::types::ChannelFrame;

/// Client-side in-memory transport.
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    accept_tx: mpsc::UnboundedSender<MemoryPeer>,
    refuse_remaining: Arc<AtomicUsize>,
    connects: Arc<AtomicUsize>,
}

/// Server side: yields one [`MemoryPeer`] per client connection.
#[derive(Debug)]
pub struct MemoryServer {
    accept_rx: Mutex<mpsc::UnboundedReceiver<MemoryPeer>>,
    refuse_remaining: Arc<AtomicUsize>,
    connects: Arc<AtomicUsize>,
}

/// Server end of one accepted connection.
#[derive(Debug)]
pub struct MemoryPeer {
    /// URL the client dialed.
    pub url: String,
    to_client: fmpsc::UnboundedSender<AppResult<String>>,
    from_client: fmpsc::UnboundedReceiver<String>,
}

impl MemoryTransport {
    /// Creates a connected transport/server pair.
    pub fn pair() -> (Self, MemoryServer) {
        let (accept_tx, accept_rx) = mpsc::unbounded_channel();
        let refuse_remaining = Arc::new(AtomicUsize::new(0));
        let connects = Arc::new(AtomicUsize::new(0));
        (
            Self {
                accept_tx,
                refuse_remaining: Arc::clone(&refuse_remaining),
                connects: Arc::clone(&connects),
            },
            MemoryServer {
                accept_rx: Mutex::new(accept_rx),
                refuse_remaining,
                connects,
            },
        )
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn connect(&self, url: &str) -> AppResult<Connection> {
        self.connects.fetch_add(1, Ordering::SeqCst);

        let refused = self
            .refuse_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refused {
            return Err(AppError::network("connection refused"));
        }

        let (to_client, client_rx) = fmpsc::unbounded::<AppResult<String>>();
        let (client_tx, from_client) = fmpsc::unbounded::<String>();

        self.accept_tx
            .send(MemoryPeer {
                url: url.to_string(),
                to_client,
                from_client,
            })
            .map_err(|_| AppError::network("memory server is gone"))?;

        let sink = client_tx.sink_map_err(|e| AppError::channel(format!("peer closed: {e}")));

        Ok(Connection {
            sink: Box::pin(sink),
            stream: Box::pin(client_rx),
        })
    }
}

impl MemoryServer {
    /// Waits for the next client connection.
    pub async fn accept(&self) -> Option<MemoryPeer> {
        self.accept_rx.lock().await.recv().await
    }

    /// Refuse the next `n` connection attempts.
    pub fn refuse_next(&self, n: usize) {
        self.refuse_remaining.store(n, Ordering::SeqCst);
    }

    /// Connection attempts made so far, refused ones included.
    pub fn connect_attempts(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl MemoryPeer {
    /// Next frame sent by the client, or `None` once the client hung up.
    pub async fn recv_frame(&mut self) -> Option<ChannelFrame> {
        loop {
            let text = self.from_client.next().await?;
            if let Ok(frame) = serde_json::from_str(&text) {
                return Some(frame);
            }
        }
    }

    /// Sends an event frame to the client. Returns `false` if it hung up.
    pub fn send_event(&self, event: &str, data: Value) -> bool {
        let frame = ChannelFrame::new(event, data);
        match serde_json::to_string(&frame) {
            Ok(text) => self.send_raw(text),
            Err(_) => false,
        }
    }

    /// Sends raw text to the client.
    pub fn send_raw(&self, text: impl Into<String>) -> bool {
        self.to_client.unbounded_send(Ok(text.into())).is_ok()
    }

    /// Whether the client side of this connection is gone.
    pub fn is_client_closed(&self) -> bool {
        self.to_client.is_closed()
    }

    /// Waits until the client drops its end of the connection.
    pub async fn closed(&mut self) {
        while self.from_client.next().await.is_some() {}
    }

    /// Breaks the connection from the server side.
    pub fn disconnect(self) {
        drop(self);
    }
}
