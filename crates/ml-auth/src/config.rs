use std::time::Duration;

use reqwest::{Client, redirect};

use crate::errors::Result;

/// Service endpoints along the chain
pub mod endpoints {
    pub const LIVE_AUTHORIZE: &str = "https://login.live.com/oauth20_authorize.srf";
    pub const XBL_AUTHENTICATE: &str = "https://user.auth.xboxlive.com/user/authenticate";
    pub const XSTS_AUTHORIZE: &str = "https://xsts.auth.xboxlive.com/xsts/authorize";
    pub const MC_LOGIN: &str = "https://api.minecraftservices.com/authentication/login_with_xbox";
    pub const MC_PROFILE: &str = "https://api.minecraftservices.com/minecraft/profile";
    pub const SESSION_JOIN: &str = "https://sessionserver.mojang.com/session/minecraft/join";
}

/// Parameters of the legacy Xbox app login surface
pub mod official {
    pub const CLIENT_ID: &str = "000000004C12AE6F";
    pub const REDIRECT_URI: &str = "https://login.live.com/oauth20_desktop.srf";
    pub const SCOPE: &str = "service::user.auth.xboxlive.com::MBI_SSL";
    pub const RESPONSE_TYPE: &str = "token";

    /// Minecraft services gate client versions on this value
    pub const LAUNCHER_USER_AGENT: &str = "MinecraftLauncher/2.2.10675";
}

/// Relying parties
pub const RP_XBOX_AUTH: &str = "http://auth.xboxlive.com";
pub const RP_MINECRAFT: &str = "rp://api.minecraftservices.com/";
pub const RP_XBOXLIVE: &str = "http://xboxlive.com";

pub const SANDBOX_RETAIL: &str = "RETAIL";

/// Time skew for token expiration (treat as expired 5 minutes early)
pub const TOKEN_EXPIRY_SKEW: Duration = Duration::from_secs(300);

/// Where each stage sends its requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub live_authorize: String,
    pub xbl_authenticate: String,
    pub xsts_authorize: String,
    pub mc_login: String,
    pub mc_profile: String,
    pub session_join: String,
}

impl Endpoints {
    /// Point every endpoint at the same host, keeping the production paths.
    ///
    /// Mostly useful for test doubles.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            live_authorize: format!("{base}/oauth20_authorize.srf"),
            xbl_authenticate: format!("{base}/user/authenticate"),
            xsts_authorize: format!("{base}/xsts/authorize"),
            mc_login: format!("{base}/authentication/login_with_xbox"),
            mc_profile: format!("{base}/minecraft/profile"),
            session_join: format!("{base}/session/minecraft/join"),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            live_authorize: endpoints::LIVE_AUTHORIZE.to_string(),
            xbl_authenticate: endpoints::XBL_AUTHENTICATE.to_string(),
            xsts_authorize: endpoints::XSTS_AUTHORIZE.to_string(),
            mc_login: endpoints::MC_LOGIN.to_string(),
            mc_profile: endpoints::MC_PROFILE.to_string(),
            session_join: endpoints::SESSION_JOIN.to_string(),
        }
    }
}

/// Query parameters for the interactive authorize page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginParams {
    pub client_id: String,
    pub redirect_uri: String,
    pub scope: String,
}

impl Default for LoginParams {
    fn default() -> Self {
        Self {
            client_id: official::CLIENT_ID.to_string(),
            redirect_uri: official::REDIRECT_URI.to_string(),
            scope: official::SCOPE.to_string(),
        }
    }
}

/// HTTP client timeouts. Unset means the client waits as long as the caller lets it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub connect: Option<Duration>,
    pub request: Option<Duration>,
}

/// Configuration shared by every stage of the chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub endpoints: Endpoints,

    pub login: LoginParams,

    /// Sent to Minecraft services on login and profile requests
    pub launcher_user_agent: String,

    /// HTTP client timeouts
    pub http_timeouts: HttpTimeouts,
}

impl AuthConfig {
    /// Build the HTTP client every stage shares.
    ///
    /// Redirects are never followed: the login stage reads the token out of the
    /// raw `Location` header.
    pub fn build_http_client(&self) -> Result<Client> {
        let mut builder = Client::builder().redirect(redirect::Policy::none());

        if let Some(connect) = self.http_timeouts.connect {
            builder = builder.connect_timeout(connect);
        }
        if let Some(request) = self.http_timeouts.request {
            builder = builder.timeout(request);
        }

        Ok(builder.build()?)
    }

    /// Same configuration with every endpoint rooted at `base`
    pub fn with_base_url(base: &str) -> Self {
        Self {
            endpoints: Endpoints::with_base(base),
            ..Self::default()
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            login: LoginParams::default(),
            launcher_user_agent: official::LAUNCHER_USER_AGENT.to_string(),
            http_timeouts: HttpTimeouts::default(),
        }
    }
}
