use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::TOKEN_EXPIRY_SKEW;
use crate::errors::{AuthError, Result};
use crate::models::{McProfile, XblTokenResponse, XuiClaims};

/// State scraped from the login page, consumed by the form post that follows
#[derive(Clone, PartialEq, Eq)]
pub struct PreAuthContext {
    /// `name=value` pairs of every cookie the page set, joined with `"; "`
    pub cookie: String,
    /// Single-use anti-forgery token (PPFT)
    pub form_token: String,
    /// Where the login form posts to
    pub post_url: String,
}

impl std::fmt::Debug for PreAuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreAuthContext")
            .field("cookie", &"[REDACTED]")
            .field("form_token", &"[REDACTED]")
            .field("post_url", &self.post_url)
            .finish()
    }
}

/// Microsoft account token delivered in the redirect fragment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LiveToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub scope: String,
    pub refresh_token: String,
    pub user_id: String,
}

/// Xbox Live user token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserToken {
    pub issue_instant: String,
    pub not_after: String,
    pub token: String,
    pub display_claims: Vec<XuiClaims>,
}

impl UserToken {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        parse_instant(&self.not_after)
    }
}

impl From<XblTokenResponse> for UserToken {
    fn from(response: XblTokenResponse) -> Self {
        Self {
            issue_instant: response.issue_instant,
            not_after: response.not_after,
            token: response.token,
            display_claims: response.display_claims.xui,
        }
    }
}

/// XSTS token for a specific relying party
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct XstsToken {
    pub issue_instant: String,
    pub not_after: String,
    pub token: String,
    /// Per-title claim records; the first one belongs to the active session
    pub display_claims: Vec<XuiClaims>,
}

impl XstsToken {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        parse_instant(&self.not_after)
    }

    /// The authoritative claim record
    pub fn primary_claims(&self) -> Result<&XuiClaims> {
        self.display_claims
            .first()
            .ok_or_else(|| AuthError::InvalidResponse("Missing XUI claims".to_string()))
    }
}

impl From<XblTokenResponse> for XstsToken {
    fn from(response: XblTokenResponse) -> Self {
        Self {
            issue_instant: response.issue_instant,
            not_after: response.not_after,
            token: response.token,
            display_claims: response.display_claims.xui,
        }
    }
}

/// Everything downstream stages need from the Xbox half of the chain
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct XblSession {
    /// Only present when the relying party releases the `xid` claim
    pub xuid: Option<String>,
    pub user_hash: String,
    pub xsts_token: String,
    pub display_claims: XuiClaims,
    pub expires_on: String,
}

impl XblSession {
    /// Collapse an XSTS token onto its first claim record.
    ///
    /// Fails when the service returned no claim records.
    pub fn from_xsts(xsts: XstsToken) -> Result<Self> {
        let claims = xsts.primary_claims()?.clone();

        Ok(Self {
            xuid: claims.xid.clone(),
            user_hash: claims.uhs.clone(),
            xsts_token: xsts.token,
            display_claims: claims,
            expires_on: xsts.not_after,
        })
    }

    /// `XBL3.0 x=<uhs>;<token>` as expected by Xbox-authenticated services
    pub fn identity_token(&self) -> String {
        format!("XBL3.0 x={};{}", self.user_hash, self.xsts_token)
    }

    pub fn gamertag(&self) -> Option<&str> {
        self.display_claims.gtg.as_deref()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        parse_instant(&self.expires_on)
    }
}

/// Minecraft services login result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameLoginResult {
    /// Account UUID (the service calls it `username`)
    pub subject_id: String,
    pub roles: Vec<serde_json::Value>,
    pub metadata: serde_json::Value,
    pub access_token: String,
    pub expires_in: u64,
    pub token_type: String,
}

/// Ready-to-use Minecraft session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSessionToken {
    pub profile: McProfile,
    pub roles: Vec<serde_json::Value>,
    pub metadata: serde_json::Value,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub token_type: String,
}

impl GameSessionToken {
    /// Value for an `Authorization` header
    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.token)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        let skew = chrono::Duration::from_std(TOKEN_EXPIRY_SKEW)
            .unwrap_or(chrono::Duration::seconds(300));
        now + skew >= self.expires_at
    }

    /// Whether the chain should be run again before using this token
    pub fn needs_refresh(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|instant| instant.with_timezone(&Utc))
}
