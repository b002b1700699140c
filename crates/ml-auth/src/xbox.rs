use reqwest::Client;
use reqwest::header::ACCEPT;
use tracing::{debug, instrument, warn};

use crate::config::{AuthConfig, RP_MINECRAFT, RP_XBOX_AUTH, SANDBOX_RETAIL};
use crate::errors::{AuthError, Result, XstsError};
use crate::models::*;
use crate::session::{UserToken, XstsToken};

/// Discriminator the user.authenticate endpoint expects in front of an RPS ticket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TicketPrefix {
    /// `t=`, a regular access token
    #[default]
    Token,
    /// `d=`, a token issued to a device-bound client
    Device,
}

impl TicketPrefix {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Token => "t=",
            Self::Device => "d=",
        }
    }
}

/// Prefix an RPS ticket unless it already carries `t=` or `d=`
pub fn prefix_ticket(ticket: &str, prefix: TicketPrefix) -> String {
    if ticket.starts_with("t=") || ticket.starts_with("d=") {
        ticket.to_string()
    } else {
        format!("{}{}", prefix.as_str(), ticket)
    }
}

/// Tokens presented to XSTS
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XstsRequest {
    /// At least one user token
    pub user_tokens: Vec<String>,
    pub device_token: Option<String>,
    pub title_token: Option<String>,
}

impl XstsRequest {
    /// Request carrying a single user token
    pub fn for_user(user_token: impl Into<String>) -> Self {
        Self {
            user_tokens: vec![user_token.into()],
            ..Self::default()
        }
    }
}

/// Trades a Microsoft access token for Xbox Live user and XSTS tokens
#[derive(Debug, Clone)]
pub struct XboxTokenExchanger {
    http: Client,
    user_token_url: String,
    xsts_url: String,
}

impl XboxTokenExchanger {
    pub fn new(http: Client, config: &AuthConfig) -> Self {
        Self {
            http,
            user_token_url: config.endpoints.xbl_authenticate.clone(),
            xsts_url: config.endpoints.xsts_authorize.clone(),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        Ok(Self::new(config.build_http_client()?, config))
    }

    /// Authenticate with Xbox Live
    #[instrument(skip(self, access_token))]
    pub async fn exchange_user_token(
        &self,
        access_token: &str,
        prefix: TicketPrefix,
    ) -> Result<UserToken> {
        let request = XblAuthRequest {
            relying_party: RP_XBOX_AUTH.to_string(),
            token_type: "JWT".to_string(),
            properties: XblAuthProperties {
                auth_method: "RPS".to_string(),
                site_name: "user.auth.xboxlive.com".to_string(),
                rps_ticket: prefix_ticket(access_token, prefix),
            },
        };

        debug!("Authenticating with Xbox Live");
        let response = self
            .http
            .post(&self.user_token_url)
            .header(ACCEPT, "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AuthError::from_response(response).await);
        }

        let xbl_response: XblTokenResponse = response.json().await?;
        Ok(xbl_response.into())
    }

    /// Authorize with XSTS for Minecraft services
    pub async fn exchange_xsts(&self, request: &XstsRequest) -> Result<XstsToken> {
        self.exchange_xsts_for(RP_MINECRAFT, request).await
    }

    /// Authorize with XSTS for an arbitrary relying party
    #[instrument(skip(self, request), fields(user_tokens = request.user_tokens.len()))]
    pub async fn exchange_xsts_for(
        &self,
        relying_party: &str,
        request: &XstsRequest,
    ) -> Result<XstsToken> {
        if request.user_tokens.is_empty() {
            return Err(AuthError::InvalidRequest(
                "XSTS needs at least one user token".to_string(),
            ));
        }

        let body = XstsAuthRequest {
            relying_party: relying_party.to_string(),
            token_type: "JWT".to_string(),
            properties: XstsAuthProperties {
                user_tokens: request.user_tokens.clone(),
                device_token: request.device_token.clone(),
                title_token: request.title_token.clone(),
                sandbox_id: SANDBOX_RETAIL.to_string(),
            },
        };

        debug!("Authorizing with XSTS");
        let response = self
            .http
            .post(&self.xsts_url)
            .header(ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();

            if let Ok(rejection) = serde_json::from_str::<XstsErrorResponse>(&text) {
                let error = XstsError::from_xerr(rejection.xerr);
                warn!(xerr = rejection.xerr, "XSTS rejected the account: {}", error);
                return Err(error.into());
            }

            return Err(AuthError::Http {
                status,
                body_snippet: text.chars().take(200).collect(),
            });
        }

        let xsts_response: XblTokenResponse = response.json().await?;
        if xsts_response.display_claims.xui.is_empty() {
            return Err(AuthError::InvalidResponse("Missing XUI claims".to_string()));
        }

        Ok(xsts_response.into())
    }
}
