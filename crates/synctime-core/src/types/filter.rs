//! Filter facets applied to the notification inbox.
//!
//! The status facet is a closed set. The type facet is open: its values are
//! whatever `entity` tags the server sends, so it carries a string rather
//! than an enum variant per category.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Read-state facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    /// Every record.
    #[default]
    All,
    /// Records with `read == false`.
    Unread,
    /// Records with `read == true`.
    Read,
}

impl StatusFilter {
    /// Whether a record with the given read flag passes this facet.
    pub fn matches(self, read: bool) -> bool {
        match self {
            Self::All => true,
            Self::Unread => !read,
            Self::Read => read,
        }
    }

    /// Return the facet as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Unread => "unread",
            Self::Read => "read",
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "unread" => Ok(Self::Unread),
            "read" => Ok(Self::Read),
            other => Err(format!("unknown status filter '{other}'")),
        }
    }
}

/// Entity-type facet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "entity", rename_all = "snake_case")]
pub enum TypeFilter {
    /// Sentinel matching every entity.
    #[default]
    All,
    /// Records whose `entity` equals this tag exactly.
    Entity(String),
}

impl TypeFilter {
    /// Build a filter for one entity tag.
    pub fn entity(tag: impl Into<String>) -> Self {
        Self::Entity(tag.into())
    }

    /// Whether a record with the given entity tag passes this facet.
    pub fn matches(&self, entity: &str) -> bool {
        match self {
            Self::All => true,
            Self::Entity(tag) => tag == entity,
        }
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Entity(tag) => f.write_str(tag),
        }
    }
}

impl FromStr for TypeFilter {
    type Err = std::convert::Infallible;

    /// `"all"` (any case) parses to the sentinel; everything else is a tag.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            Ok(Self::Entity(trimmed.to_string()))
        }
    }
}
