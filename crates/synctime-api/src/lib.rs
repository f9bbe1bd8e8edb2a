//! # synctime-api
//!
//! Bearer-authenticated JSON client for the SyncTime REST API. The
//! [`traits`] module defines the seams the notification engine depends on;
//! [`notification`] and [`calendar`] provide the HTTP implementations.

pub mod calendar;
pub mod client;
pub mod dto;
pub mod notification;
pub mod traits;

pub use calendar::HttpCalendarApi;
pub use client::ApiClient;
pub use notification::HttpNotificationApi;
pub use traits::{CalendarLookup, NotificationRemote};
