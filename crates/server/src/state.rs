//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::BeaconConfig;
use crate::google::{GoogleClient, GoogleEndpoints, GoogleError, OAuthClient, http_client};
use crate::services::SnapshotStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the configuration, the Google clients and the snapshot store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: BeaconConfig,
    google: GoogleClient,
    oauth: OAuthClient,
    snapshots: SnapshotStore,
}

impl AppState {
    /// Create application state talking to the real Google endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: BeaconConfig) -> Result<Self, GoogleError> {
        Self::with_endpoints(config, GoogleEndpoints::default())
    }

    /// Create application state against custom endpoints (a mock server in tests).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_endpoints(
        config: BeaconConfig,
        endpoints: GoogleEndpoints,
    ) -> Result<Self, GoogleError> {
        let http = http_client()?;
        let oauth = OAuthClient::new(http.clone(), &config.oauth, &endpoints);
        let google = GoogleClient::new(http, endpoints);
        let snapshots = SnapshotStore::new(config.snapshot_dir.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                google,
                oauth,
                snapshots,
            }),
        })
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &BeaconConfig {
        &self.inner.config
    }

    /// Get a reference to the Google API client.
    #[must_use]
    pub fn google(&self) -> &GoogleClient {
        &self.inner.google
    }

    /// Get a reference to the OAuth client.
    #[must_use]
    pub fn oauth(&self) -> &OAuthClient {
        &self.inner.oauth
    }

    /// Get a reference to the snapshot file store.
    #[must_use]
    pub fn snapshots(&self) -> &SnapshotStore {
        &self.inner.snapshots
    }
}
