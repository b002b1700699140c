use serde::{Deserialize, Serialize};

/// Xbox Live user.authenticate request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct XblAuthRequest {
    pub relying_party: String,
    pub token_type: String,
    pub properties: XblAuthProperties,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct XblAuthProperties {
    pub auth_method: String,
    pub site_name: String,
    pub rps_ticket: String,
}

/// Response shape shared by user.authenticate and xsts.authorize
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct XblTokenResponse {
    pub issue_instant: String,
    pub not_after: String,
    pub token: String,
    pub display_claims: XblDisplayClaims,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct XblDisplayClaims {
    pub xui: Vec<XuiClaims>,
}

/// One per-title claim record
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct XuiClaims {
    /// User hash
    pub uhs: String,
    /// Gamertag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gtg: Option<String>,
    /// Xbox user id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xid: Option<String>,
    /// Age group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utr: Option<String>,
    /// Space separated privilege ids
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prv: Option<String>,
}

/// XSTS authorize request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct XstsAuthRequest {
    pub relying_party: String,
    pub token_type: String,
    pub properties: XstsAuthProperties,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct XstsAuthProperties {
    pub user_tokens: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_token: Option<String>,
    pub sandbox_id: String,
}

/// XSTS error response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct XstsErrorResponse {
    #[serde(rename = "XErr")]
    pub xerr: u64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub redirect: Option<String>,
}

/// Minecraft login_with_xbox request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct McLoginRequest {
    pub identity_token: String,
}

/// Minecraft login_with_xbox response
#[derive(Debug, Clone, Deserialize)]
pub struct McLoginResponse {
    /// Despite the name this is the account UUID, not a player name
    pub username: String,
    #[serde(default)]
    pub roles: Vec<serde_json::Value>,
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub access_token: String,
    pub expires_in: u64,
    pub token_type: String,
}

/// Minecraft profile.
///
/// Only `id` is known until the profile endpoint has been queried.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct McProfile {
    /// UUID without dashes
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skins: Option<Vec<McSkin>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capes: Option<Vec<McCape>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_actions: Option<serde_json::Value>,
}

impl McProfile {
    /// Profile stub carrying only the account UUID
    pub fn id_only(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct McSkin {
    pub id: String,
    pub state: String,
    pub url: String,
    #[serde(default)]
    pub texture_key: Option<String>,
    pub variant: String,
    #[serde(default)]
    pub alias: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct McCape {
    pub id: String,
    pub state: String,
    pub url: String,
    #[serde(default)]
    pub alias: Option<String>,
}

/// Session server join request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub access_token: String,
    pub selected_profile: String,
    pub server_id: String,
}
