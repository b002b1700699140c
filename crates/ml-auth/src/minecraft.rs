use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, warn};

use crate::config::AuthConfig;
use crate::errors::{AuthError, Result};
use crate::models::{McLoginRequest, McLoginResponse, McProfile};
use crate::session::{GameLoginResult, XblSession};

/// Logs an Xbox identity into Minecraft services
#[derive(Debug, Clone)]
pub struct GameServiceAuthenticator {
    http: Client,
    login_url: String,
    profile_url: String,
    user_agent: String,
}

impl GameServiceAuthenticator {
    pub fn new(http: Client, config: &AuthConfig) -> Self {
        Self {
            http,
            login_url: config.endpoints.mc_login.clone(),
            profile_url: config.endpoints.mc_profile.clone(),
            user_agent: config.launcher_user_agent.clone(),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        Ok(Self::new(config.build_http_client()?, config))
    }

    /// Login to Minecraft with an XSTS token.
    ///
    /// Any non-2xx answer is returned as [`AuthError::Http`]; an outdated user
    /// agent shows up here too.
    #[instrument(skip(self, session))]
    pub async fn login_with_game_token(&self, session: &XblSession) -> Result<GameLoginResult> {
        let request = McLoginRequest {
            identity_token: session.identity_token(),
        };

        debug!("Logging in to Minecraft Services");
        let response = self
            .http
            .post(&self.login_url)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, &self.user_agent)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "Minecraft Services refused the login");
            return Err(AuthError::from_response(response).await);
        }

        let mc_response: McLoginResponse = response.json().await?;
        Ok(GameLoginResult {
            subject_id: mc_response.username,
            roles: mc_response.roles,
            metadata: mc_response.metadata,
            access_token: mc_response.access_token,
            expires_in: mc_response.expires_in,
            token_type: mc_response.token_type,
        })
    }

    /// Fetch Minecraft profile
    #[instrument(skip(self, access_token))]
    pub async fn fetch_profile(&self, token_type: &str, access_token: &str) -> Result<McProfile> {
        debug!("Fetching Minecraft profile");
        let response = self
            .http
            .get(&self.profile_url)
            .header(AUTHORIZATION, format!("{} {}", token_type, access_token))
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?;

        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(AuthError::ProfileNotFound);
        }

        if !status.is_success() {
            return Err(AuthError::from_response(response).await);
        }

        let profile: McProfile = response.json().await?;
        Ok(profile)
    }
}
