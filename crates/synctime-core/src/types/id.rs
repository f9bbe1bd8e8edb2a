//! Newtype wrappers for identifiers issued by the SyncTime API.
//!
//! The API is not consistent about identifier shapes: some endpoints return
//! numbers, others strings. Every id is therefore kept as an opaque string,
//! and numeric wire values are stringified on deserialization.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Macro to define an opaque string-backed ID newtype.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create an identifier from any string-like value.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Return the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the identifier is blank.
            pub fn is_empty(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                RawId::deserialize(deserializer).map(|raw| Self(raw.into_string()))
            }
        }
    };
}

/// Wire representation of an identifier: either a JSON string or a number.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Unsigned(u64),
    Signed(i64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Unsigned(n) => n.to_string(),
            RawId::Signed(n) => n.to_string(),
        }
    }
}

define_id!(
    /// Unique identifier for a signed-in user.
    UserId
);

define_id!(
    /// Unique identifier for a notification.
    NotificationId
);

define_id!(
    /// Identifier of a domain object referenced by a notification.
    EntityId
);

define_id!(
    /// Unique identifier for a calendar note.
    NoteId
);

define_id!(
    /// Unique identifier for a routine (the day a note belongs to).
    RoutineId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_numeric_id() {
        let id: NotificationId = serde_json::from_str("42").expect("numeric id");
        assert_eq!(id.as_str(), "42");
    }

    #[test]
    fn test_deserialize_string_id() {
        let id: UserId = serde_json::from_str("\"a1b2\"").expect("string id");
        assert_eq!(id, UserId::from("a1b2"));
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = NotificationId::from(7u64);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"7\"");
    }

    #[test]
    fn test_blank_is_empty() {
        assert!(UserId::new("  ").is_empty());
        assert!(!UserId::new("1").is_empty());
    }
}
