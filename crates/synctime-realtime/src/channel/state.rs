//! Observable lifecycle of a user's push channel.

use std::fmt;

/// Where a user channel is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelState {
    /// Opening the socket.
    Connecting,
    /// Socket open, `auth` sent, waiting for the acknowledgement.
    Authenticating,
    /// Authenticated; push events are being delivered.
    Ready,
    /// Waiting before the next connection attempt.
    Reconnecting {
        /// 1-based attempt counter since the last successful handshake.
        attempt: u32,
        /// Delay before the attempt in milliseconds.
        delay_ms: u64,
    },
    /// The server rejected authentication; no push updates until the
    /// channel is reopened.
    Degraded {
        /// Reason reported by the server.
        reason: String,
    },
    /// Closed for good (last lease released).
    Closed,
}

impl ChannelState {
    /// Whether push events are currently delivered.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Whether the channel will never deliver again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connecting => write!(f, "connecting"),
            Self::Authenticating => write!(f, "authenticating"),
            Self::Ready => write!(f, "ready"),
            Self::Reconnecting { attempt, delay_ms } => {
                write!(f, "reconnecting (attempt {attempt}, in {delay_ms}ms)")
            }
            Self::Degraded { reason } => write!(f, "degraded: {reason}"),
            Self::Closed => write!(f, "closed"),
        }
    }
}
