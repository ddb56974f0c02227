//! Signed-in user's profile.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{GoogleClient, GoogleError};

/// Subset of the `userinfo` response Beacon uses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub picture: Option<String>,
}

impl GoogleClient {
    /// Fetch the profile of the token's owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or upstream rejects the token.
    #[instrument(skip_all)]
    pub async fn user_profile(&self, access_token: &str) -> Result<UserProfile, GoogleError> {
        let url = format!("{}/oauth2/v1/userinfo", self.endpoints().userinfo);
        let profile: UserProfile = self.get_json(&url, access_token, &[("alt", "json")]).await?;
        tracing::debug!(user_id = ?profile.id, "Fetched user profile");
        Ok(profile)
    }
}
