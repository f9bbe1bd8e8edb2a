//! Event subscriptions and channel state.

mod gate;
pub mod registry;
pub mod state;
pub mod subscription;

pub use registry::{EventHandler, HandlerRegistry};
pub use state::ChannelState;
pub use subscription::{Subscription, SubscriptionId};
