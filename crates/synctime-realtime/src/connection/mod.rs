//! Socket transports and the per-user connection loop.

pub mod backoff;
pub mod memory;
pub mod transport;
pub(crate) mod worker;

pub use backoff::Backoff;
pub use memory::{MemoryPeer, MemoryServer, MemoryTransport};
pub use transport::{Connection, Transport, WsTransport};
