use std::sync::Arc;

use tracing::{debug, instrument};

use crate::clock::{Clock, SystemClock};
use crate::config::AuthConfig;
use crate::credential::Credential;
use crate::errors::{AuthError, Result};
use crate::live::LiveAuthenticator;
use crate::minecraft::GameServiceAuthenticator;
use crate::models::McProfile;
use crate::session::{GameSessionToken, XblSession};
use crate::xbox::{TicketPrefix, XboxTokenExchanger, XstsRequest};

/// Runs the whole chain from credential to game token.
///
/// Holds no session state: every call starts from scratch and the first
/// failing stage ends it with that stage's error.
#[derive(Clone)]
pub struct AuthPipeline {
    live: LiveAuthenticator,
    xbox: XboxTokenExchanger,
    game: GameServiceAuthenticator,
    clock: Arc<dyn Clock>,
}

impl AuthPipeline {
    /// Create a pipeline whose stages share one HTTP client
    pub fn new(config: &AuthConfig) -> Result<Self> {
        let http = config.build_http_client()?;

        Ok(Self {
            live: LiveAuthenticator::new(http.clone(), config),
            xbox: XboxTokenExchanger::new(http.clone(), config),
            game: GameServiceAuthenticator::new(http, config),
            clock: Arc::new(SystemClock),
        })
    }

    /// Replace the clock used to stamp `expires_at`
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn live(&self) -> &LiveAuthenticator {
        &self.live
    }

    pub fn xbox(&self) -> &XboxTokenExchanger {
        &self.xbox
    }

    pub fn game(&self) -> &GameServiceAuthenticator {
        &self.game
    }

    /// Credential to XSTS session
    #[instrument(skip(self, credential))]
    pub async fn acquire_xbox_session(&self, credential: Credential) -> Result<XblSession> {
        debug!("Starting Xbox Live login flow");

        // Step 1: Microsoft account login
        let live = self.live.authenticate(credential).await?;

        // Step 2: Xbox Live user token
        let user = self
            .xbox
            .exchange_user_token(&live.access_token, TicketPrefix::default())
            .await?;

        // Step 3: XSTS for Minecraft services
        let xsts = self
            .xbox
            .exchange_xsts(&XstsRequest::for_user(user.token))
            .await?;

        XblSession::from_xsts(xsts)
    }

    /// XSTS session to Minecraft token, optionally with the full profile
    #[instrument(skip(self, session))]
    pub async fn acquire_game_session(
        &self,
        session: &XblSession,
        fetch_profile: bool,
    ) -> Result<GameSessionToken> {
        let login = self.game.login_with_game_token(session).await?;
        let expires_at = i64::try_from(login.expires_in)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .and_then(|lifetime| self.clock.now().checked_add_signed(lifetime))
            .ok_or_else(|| AuthError::InvalidResponse("expires_in out of range".to_string()))?;

        let profile = if fetch_profile {
            self.game
                .fetch_profile(&login.token_type, &login.access_token)
                .await?
        } else {
            McProfile::id_only(login.subject_id)
        };

        Ok(GameSessionToken {
            profile,
            roles: login.roles,
            metadata: login.metadata,
            token: login.access_token,
            expires_at,
            token_type: login.token_type,
        })
    }
}

impl std::fmt::Debug for AuthPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthPipeline")
            .field("live", &self.live)
            .field("xbox", &self.xbox)
            .field("game", &self.game)
            .finish_non_exhaustive()
    }
}
