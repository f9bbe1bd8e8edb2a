//! Transport abstraction over the push socket.

use std::pin::Pin;

use async_trait::async_trait;
use futures::{Sink, SinkExt, Stream, StreamExt, future};
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;

use synctime_core::error::AppError;
use synctime_core::result::AppResult;

/// Outgoing half of a connection: JSON text frames.
pub type FrameSink = Pin<Box<dyn Sink<String, Error = AppError> + Send>>;

/// Incoming half of a connection: JSON text frames until the peer closes.
pub type FrameStream = Pin<Box<dyn Stream<Item = AppResult<String>> + Send>>;

/// An open duplex connection.
pub struct Connection {
    /// Frames to the server.
    pub sink: FrameSink,
    /// Frames from the server.
    pub stream: FrameStream,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection").finish_non_exhaustive()
    }
}

/// Opens connections to the push server.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Connect to `url`.
    async fn connect(&self, url: &str) -> AppResult<Connection>;
}

/// WebSocket transport backed by `tokio-tungstenite`.
#[derive(Debug, Clone, Default)]
pub struct WsTransport;

impl WsTransport {
    /// Creates a WebSocket transport.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn connect(&self, url: &str) -> AppResult<Connection> {
        let (socket, response) = tokio_tungstenite::connect_async(url).await?;
        debug!(url, status = %response.status(), "WebSocket connected");

        let (write, read) = socket.split();

        let sink = write
            .sink_map_err(AppError::from)
            .with(|text: String| future::ready(Ok::<_, AppError>(Message::text(text))));

        let stream = read.filter_map(|message| {
            future::ready(match message {
                Ok(Message::Text(text)) => Some(Ok(text.as_str().to_owned())),
                Ok(Message::Binary(bytes)) => match String::from_utf8(bytes.to_vec()) {
                    Ok(text) => Some(Ok(text)),
                    Err(_) => {
                        debug!("Dropping non-UTF-8 binary frame");
                        None
                    }
                },
                // Ping/pong are answered by tungstenite; close ends the stream.
                Ok(_) => None,
                Err(e) => Some(Err(AppError::from(e))),
            })
        });

        Ok(Connection {
            sink: Box::pin(sink),
            stream: Box::pin(stream),
        })
    }
}
