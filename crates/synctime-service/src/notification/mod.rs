//! Notification store, projections and the service that writes them.

pub mod projection;
pub mod relative_time;
pub mod service;
pub mod store;

pub use projection::Counts;
pub use relative_time::format_relative;
pub use service::NotificationService;
pub use store::{NotificationStore, ReadMark};
