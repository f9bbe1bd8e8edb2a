//! View surfaces: the header badge and the dropdown panel.

pub mod badge;
pub mod deeplink;
pub mod dropdown;

pub use badge::{BadgeCounter, BadgeView};
pub use deeplink::{DeepLinkResolver, NavigationTarget};
pub use dropdown::{DropdownPanel, DropdownView, NotificationRow};
