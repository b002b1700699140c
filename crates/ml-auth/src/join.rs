use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::config::AuthConfig;
use crate::digest::compute_session_digest;
use crate::errors::{AuthError, Result};
use crate::models::JoinRequest;

/// Client half of the server join handshake.
///
/// The game server later asks the session server whether this profile joined
/// with the same server hash, so a join must happen exactly once per server
/// challenge and is never retried.
#[derive(Debug, Clone)]
pub struct SessionJoiner {
    http: Client,
    join_url: String,
}

impl SessionJoiner {
    pub fn new(http: Client, config: &AuthConfig) -> Self {
        Self {
            http,
            join_url: config.endpoints.session_join.clone(),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        Ok(Self::new(config.build_http_client()?, config))
    }

    /// Announce a join to the session server
    #[instrument(skip(self, access_token, shared_secret, public_key))]
    pub async fn join(
        &self,
        access_token: &str,
        profile_id: &str,
        server_id: &str,
        shared_secret: &[u8],
        public_key: &[u8],
    ) -> Result<()> {
        let request = JoinRequest {
            access_token: access_token.to_string(),
            selected_profile: profile_id.to_string(),
            server_id: compute_session_digest(server_id, shared_secret, public_key),
        };

        debug!("Joining server session");
        let response = self.http.post(&self.join_url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Session server rejected the join");
            return Err(AuthError::JoinRejected(status));
        }

        Ok(())
    }
}
