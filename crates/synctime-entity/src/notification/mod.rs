//! Notification records and push payloads.

pub mod model;
pub mod push;

pub use model::NotificationRecord;
pub use push::PushNotification;
