//! Per-user connection loop: connect, authenticate, deliver, reconnect.

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use synctime_core::config::realtime::RealtimeConfig;
use synctime_core::types::id::UserId;

use super::backoff::Backoff;
use super::transport::{Connection, Transport};
use crate::channel::registry::HandlerRegistry;
use crate::channel::state::ChannelState;
use crate::message::serializer::{auth_frame, deserialize_inbound};
use crate::message::types::{InboundMessage, auth_error_reason};

/// Everything the loop needs, owned by the spawned task.
pub(crate) struct Worker {
    pub user_id: UserId,
    pub transport: Arc<dyn Transport>,
    pub registry: Arc<HandlerRegistry>,
    pub state: watch::Sender<ChannelState>,
    pub config: RealtimeConfig,
    pub cancel: CancellationToken,
}

/// Why one connection ended.
enum SessionEnd {
    /// The last lease was released.
    Cancelled,
    /// The server answered `authError`.
    Rejected(String),
    /// Transport failure, server hang-up, or handshake timeout.
    Disconnected(String),
}

impl Worker {
    fn set_state(&self, state: ChannelState) {
        debug!(user_id = %self.user_id, %state, "Channel state change");
        self.state.send_replace(state);
    }

    /// Run until cancelled.
    pub(crate) async fn run(self) {
        let mut backoff = Backoff::from_config(&self.config);
        info!(user_id = %self.user_id, url = %self.config.url, "Push channel opening");

        loop {
            if self.cancel.is_cancelled() {
                break;
            }
            self.set_state(ChannelState::Connecting);

            let connected = tokio::select! {
                _ = self.cancel.cancelled() => break,
                res = self.transport.connect(&self.config.url) => res,
            };

            match connected {
                Ok(connection) => match self.session(connection, &mut backoff).await {
                    SessionEnd::Cancelled => break,
                    SessionEnd::Rejected(reason) => {
                        warn!(
                            user_id = %self.user_id,
                            %reason,
                            "Push channel authentication rejected; continuing without push updates"
                        );
                        self.set_state(ChannelState::Degraded { reason });
                        self.cancel.cancelled().await;
                        break;
                    }
                    SessionEnd::Disconnected(reason) => {
                        warn!(user_id = %self.user_id, %reason, "Push channel disconnected");
                    }
                },
                Err(e) => {
                    warn!(user_id = %self.user_id, error = %e, "Push channel connect failed");
                }
            }

            let delay = backoff.next_delay();
            self.set_state(ChannelState::Reconnecting {
                attempt: backoff.attempt(),
                delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            });

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.set_state(ChannelState::Closed);
        info!(user_id = %self.user_id, "Push channel closed");
    }

    /// Drive one connection from handshake to hang-up.
    async fn session(&self, connection: Connection, backoff: &mut Backoff) -> SessionEnd {
        let Connection {
            mut sink,
            mut stream,
        } = connection;

        let handshake = match auth_frame(&self.user_id) {
            Ok(frame) => frame,
            Err(e) => return SessionEnd::Disconnected(e.to_string()),
        };
        if let Err(e) = sink.send(handshake).await {
            return SessionEnd::Disconnected(e.to_string());
        }
        self.set_state(ChannelState::Authenticating);

        let deadline = tokio::time::sleep(self.config.auth_timeout());
        tokio::pin!(deadline);
        let mut ready = false;

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    let _ = sink.close().await;
                    return SessionEnd::Cancelled;
                }
                _ = &mut deadline, if !ready => {
                    let _ = sink.close().await;
                    return SessionEnd::Disconnected("authentication acknowledgement timed out".to_string());
                }
                frame = stream.next() => {
                    let text = match frame {
                        None => return SessionEnd::Disconnected("closed by server".to_string()),
                        Some(Err(e)) => return SessionEnd::Disconnected(e.to_string()),
                        Some(Ok(text)) => text,
                    };

                    match deserialize_inbound(&text, self.config.max_frame_bytes) {
                        Err(e) => {
                            warn!(user_id = %self.user_id, error = %e, "Skipping invalid frame");
                        }
                        Ok(InboundMessage::AuthSuccess) => {
                            if !ready {
                                ready = true;
                                backoff.reset();
                                self.set_state(ChannelState::Ready);
                                info!(user_id = %self.user_id, "Push channel authenticated");
                            }
                        }
                        Ok(InboundMessage::AuthError(data)) => {
                            let _ = sink.close().await;
                            return SessionEnd::Rejected(auth_error_reason(&data));
                        }
                        Ok(InboundMessage::Event { name, data }) => {
                            if ready {
                                let delivered = self.registry.dispatch(&name, &data);
                                debug!(user_id = %self.user_id, event = %name, delivered, "Event delivered");
                            } else {
                                debug!(user_id = %self.user_id, event = %name, "Dropping event received before authentication");
                            }
                        }
                    }
                }
            }
        }
    }
}
