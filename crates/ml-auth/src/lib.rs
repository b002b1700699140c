//! Microsoft account to Minecraft session authentication chain
//!
//! This crate signs a Microsoft account in with an email and password and walks
//! it through every token exchange needed to play on Minecraft servers.
//!
//! # Authentication Flow
//!
//! 1. Microsoft account login through the login.live.com web form ([`LiveAuthenticator`])
//! 2. Xbox Live user token exchange ([`XboxTokenExchanger::exchange_user_token`])
//! 3. XSTS authorization ([`XboxTokenExchanger::exchange_xsts`])
//! 4. Minecraft Services login ([`GameServiceAuthenticator::login_with_game_token`])
//! 5. Profile retrieval, on request ([`GameServiceAuthenticator::fetch_profile`])
//!
//! [`AuthPipeline`] strings these together. [`SessionJoiner`] is separate: it
//! proves ownership of a session to a game server during the login handshake.
//!
//! # Example
//!
//! ```no_run
//! use ml_auth::{AuthConfig, AuthPipeline, Credential};
//!
//! # async fn example() -> ml_auth::Result<()> {
//! let pipeline = AuthPipeline::new(&AuthConfig::default())?;
//!
//! let xbl = pipeline
//!     .acquire_xbox_session(Credential::new("player@example.com", "password"))
//!     .await?;
//! let game = pipeline.acquire_game_session(&xbl, true).await?;
//!
//! println!("Logged in as {:?}, token valid until {}", game.profile.name, game.expires_at);
//! # Ok(())
//! # }
//! ```
//!
//! # Important Notes
//!
//! - Accounts with two-step verification fail with [`AuthError::InteractiveAuthRequired`]
//! - Nothing is cached or retried; run the chain again when a token expires
//! - Tokens should be stored securely and never logged

pub mod clock;
pub mod config;
pub mod credential;
pub mod digest;
pub mod errors;
pub mod join;
pub mod live;
pub mod minecraft;
pub mod models;
pub mod pipeline;
pub mod session;
pub mod xbox;

// Re-export main types
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{AuthConfig, Endpoints, HttpTimeouts, LoginParams};
pub use credential::Credential;
pub use digest::compute_session_digest;
pub use errors::{AuthError, Result, XstsError};
pub use join::SessionJoiner;
pub use live::LiveAuthenticator;
pub use minecraft::GameServiceAuthenticator;
pub use models::{McCape, McProfile, McSkin, XuiClaims};
pub use pipeline::AuthPipeline;
pub use session::{
    GameLoginResult, GameSessionToken, LiveToken, PreAuthContext, UserToken, XblSession,
    XstsToken,
};
pub use xbox::{TicketPrefix, XboxTokenExchanger, XstsRequest};
