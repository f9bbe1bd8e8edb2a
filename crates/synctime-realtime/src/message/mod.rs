//! Push channel message framing.

pub mod serializer;
pub mod types;
pub mod validator;

pub use types::{ChannelFrame, InboundMessage};
