//! # synctime-entity
//!
//! Domain models exchanged with the SyncTime API and push channel.

pub mod calendar;
pub mod notification;
pub mod timestamp;

pub use calendar::{Note, Routine};
pub use notification::{NotificationRecord, PushNotification};
