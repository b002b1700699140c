use thiserror::Error;

/// Errors produced anywhere along the authentication chain
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Login page format changed: {0}")]
    Protocol(String),

    #[error("Credential login was not accepted - wrong password or a second factor is required")]
    InteractiveAuthRequired,

    #[error("Login form post did not redirect")]
    MissingRedirect,

    #[error("XSTS authorization rejected: {0}")]
    XstsRejected(#[from] XstsError),

    #[error("Minecraft profile not found - user may not own Minecraft or hasn't created a profile")]
    ProfileNotFound,

    #[error("Session join rejected with HTTP {0}")]
    JoinRejected(reqwest::StatusCode),

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP error {status}: {body_snippet}")]
    Http {
        status: reqwest::StatusCode,
        body_snippet: String,
    },

    #[error("JSON serialization/deserialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl AuthError {
    /// Build an `Http` error from a non-success response, keeping a short body excerpt
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Self::Http {
            status,
            body_snippet: body.chars().take(200).collect(),
        }
    }
}

/// XSTS-specific error codes from the XErr field
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum XstsError {
    #[error("Account is banned from Xbox Live (XErr: 2148916227)")]
    Banned,

    #[error("Guardian has not allowed this account to play online (XErr: 2148916229)")]
    GuardianRestricted,

    #[error("Account doesn't have an Xbox account (XErr: 2148916233)")]
    NoXboxAccount,

    #[error("Xbox Live not available in this country (XErr: 2148916235)")]
    RegionNotSupported,

    #[error("Adult verification required on Xbox page (XErr: {0})")]
    AdultVerificationRequired(u64),

    #[error("Child account requires Family (XErr: 2148916238)")]
    ChildAccountRequiresFamily,

    #[error("Unknown XSTS error code: {0}")]
    Unknown(u64),
}

impl XstsError {
    /// Parse XErr code from XSTS response
    pub fn from_xerr(code: u64) -> Self {
        match code {
            2148916227 => Self::Banned,
            2148916229 => Self::GuardianRestricted,
            2148916233 => Self::NoXboxAccount,
            2148916235 => Self::RegionNotSupported,
            code @ (2148916236 | 2148916237) => Self::AdultVerificationRequired(code),
            2148916238 => Self::ChildAccountRequiresFamily,
            code => Self::Unknown(code),
        }
    }

    /// The raw XErr code as returned by the service
    pub fn code(&self) -> u64 {
        match self {
            Self::Banned => 2148916227,
            Self::GuardianRestricted => 2148916229,
            Self::NoXboxAccount => 2148916233,
            Self::RegionNotSupported => 2148916235,
            Self::AdultVerificationRequired(code) => *code,
            Self::ChildAccountRequiresFamily => 2148916238,
            Self::Unknown(code) => *code,
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
