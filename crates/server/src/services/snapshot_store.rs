//! On-disk persistence of account snapshots.
//!
//! Every login and every manual refresh writes one pretty-printed JSON file
//! named `account_{user}_{timestamp}.json`. Files are never read back; the
//! session keeps the live copy.

use std::path::{Path, PathBuf};

use beacon_core::snapshot::AccountSnapshot;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors from writing a snapshot file.
#[derive(Debug, Error)]
pub enum SnapshotStoreError {
    #[error("failed to write snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Directory the snapshots are written to.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    #[must_use]
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `snapshot` as `account_{user}_{timestamp}.json`, creating the
    /// directory on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be serialized or written.
    pub async fn save(
        &self,
        snapshot: &AccountSnapshot,
        at: DateTime<Utc>,
    ) -> Result<PathBuf, SnapshotStoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.dir.join(snapshot.file_name(at));
        let body = serde_json::to_vec_pretty(snapshot)?;
        tokio::fs::write(&path, body).await?;

        tracing::info!(path = %path.display(), "Account snapshot saved");
        Ok(path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use beacon_core::snapshot::SnapshotUser;
    use chrono::TimeZone;

    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "beacon-snapshot-store-{name}-{}",
            std::process::id()
        ))
    }

    #[tokio::test]
    async fn test_save_creates_directory_and_writes_pretty_json() {
        let dir = scratch_dir("save");
        let _ = tokio::fs::remove_dir_all(&dir).await;
        let store = SnapshotStore::new(dir.join("nested"));

        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 15).unwrap();
        let snapshot = AccountSnapshot::assemble(
            at,
            SnapshotUser::new(Some("Ada Lovelace"), Some("ada@example.com")),
            Vec::new(),
            Vec::new(),
        );

        let path = store.save(&snapshot, at).await.unwrap();
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some("account_Ada_Lovelace_2024-05-01T12-30-15-000Z.json")
        );

        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(written.contains("\n  \"metadata\""));
        let parsed: AccountSnapshot = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, snapshot);

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
