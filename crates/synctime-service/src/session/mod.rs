//! Sign-in scoped state and the push feed that keeps it current.

pub mod context;
pub mod feed;
pub mod memorized;

pub use context::{Session, SessionContext, SessionDeps};
pub use feed::NotificationFeed;
pub use memorized::MemorizedFilter;
