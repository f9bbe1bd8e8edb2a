//! # synctime-service
//!
//! Notification engine for a signed-in SyncTime session. A
//! [`SessionContext`] builds one [`Session`] per sign-in: the shared
//! [`NotificationStore`], the [`NotificationService`] that writes it, the
//! badge and dropdown views, and the push [`NotificationFeed`].
//!
//! Services follow constructor injection; remote collaborators arrive as
//! `Arc<dyn Trait>`.

pub mod flash;
pub mod notification;
pub mod session;
pub mod view;

pub use flash::{FlashLevel, FlashLog, FlashMessage, FlashSink};
pub use notification::{Counts, NotificationService, NotificationStore};
pub use session::{MemorizedFilter, NotificationFeed, Session, SessionContext, SessionDeps};
pub use view::{BadgeCounter, BadgeView, DeepLinkResolver, DropdownPanel, NavigationTarget};
