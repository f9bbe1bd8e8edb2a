//! The memorized-filter blob persisted by the sign-in flow.
//!
//! Only its `id` is read; every other field belongs to its owner.

use std::path::Path;

use serde::Deserialize;

use synctime_core::error::AppError;
use synctime_core::result::AppResult;
use synctime_core::types::id::UserId;

/// Signed-in user as recorded in the blob.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MemorizedFilter {
    /// Identifier keying the push channel and API calls.
    pub id: UserId,
}

impl MemorizedFilter {
    /// Parses a blob. A blank id means nobody is signed in.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let blob: Self = serde_json::from_str(raw)?;
        if blob.id.is_empty() {
            return Err(AppError::authentication("No signed-in user in memorized filter"));
        }
        Ok(blob)
    }

    /// Reads and parses the blob at `path`.
    pub async fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::authentication(format!(
                "Cannot read memorized filter '{}': {e}",
                path.display()
            ))
        })?;
        Self::parse(&raw)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use synctime_core::error::ErrorKind;

    use super::*;

    #[tokio::test]
    async fn test_load_reads_id_only() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"id": 42, "name": "Ana", "theme": "dark"}}"#).unwrap();

        let blob = MemorizedFilter::load(file.path()).await.unwrap();
        assert_eq!(blob.id, UserId::from("42"));
    }

    #[tokio::test]
    async fn test_missing_file_is_authentication_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = MemorizedFilter::load(dir.path().join("absent.json"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[test]
    fn test_blank_id_rejected() {
        let err = MemorizedFilter::parse(r#"{"id": ""}"#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
        assert!(MemorizedFilter::parse("{}").is_err());
    }
}
