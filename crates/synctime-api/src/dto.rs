//! Request and response bodies shared by the endpoints.

use serde::{Deserialize, Serialize};

use synctime_core::types::id::NotificationId;

/// Body of the bulk mark-read and delete calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdsRequest {
    /// Target notification ids.
    pub ids: Vec<NotificationId>,
}

/// A response body that may or may not be wrapped in `{ "data": ... }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    /// `{ "data": T }`
    Wrapped {
        /// Wrapped payload.
        data: T,
    },
    /// Bare `T`.
    Bare(T),
}

impl<T> Envelope<T> {
    /// Unwrap the payload.
    pub fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(data) => data,
        }
    }
}

/// Body of the unseen-count endpoint.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CountResponse {
    /// A bare number.
    Plain(u64),
    /// `{ "count": n }`
    Object {
        /// Unseen notifications.
        count: u64,
    },
    /// `{ "data": n }` or `{ "data": { "count": n } }`
    Wrapped {
        /// Wrapped count.
        data: Box<CountResponse>,
    },
}

impl CountResponse {
    /// The count, whichever shape it arrived in.
    pub fn value(&self) -> u64 {
        match self {
            CountResponse::Plain(n) => *n,
            CountResponse::Object { count } => *count,
            CountResponse::Wrapped { data } => data.value(),
        }
    }
}
