//! Business logic services.
//!
//! # Services
//!
//! - `snapshot` - Fan-out collection of the aggregate account snapshot
//! - `snapshot_store` - Persistence of snapshots as JSON files

mod snapshot;
mod snapshot_store;

pub use snapshot::collect_snapshot;
pub use snapshot_store::{SnapshotStore, SnapshotStoreError};

use beacon_core::snapshot::AccountSnapshot;

use crate::error::AppError;
use crate::google::GoogleTokens;
use crate::models::DashboardSession;
use crate::state::AppState;

/// Collect a fresh snapshot, write it to disk and cache it in the session.
///
/// A failed write is logged and the snapshot is still cached without a path.
///
/// # Errors
///
/// Returns an error only if the session store fails.
pub async fn refresh_account_snapshot(
    state: &AppState,
    session: &DashboardSession,
    tokens: &GoogleTokens,
) -> Result<AccountSnapshot, AppError> {
    let snapshot = collect_snapshot(state.google(), &tokens.access_token).await;

    let path = match state
        .snapshots()
        .save(&snapshot, snapshot.metadata.data_collected_at)
        .await
    {
        Ok(path) => Some(path),
        Err(e) => {
            tracing::error!(error = %e, "Failed to persist account snapshot");
            None
        }
    };

    session.store_snapshot(&snapshot, path).await?;
    Ok(snapshot)
}
