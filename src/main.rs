use anyhow::{Context, Result};
use ml_auth::{AuthConfig, AuthPipeline, Credential};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let email = std::env::var("MC_LOGIN_EMAIL").context("MC_LOGIN_EMAIL is not set")?;
    let password = std::env::var("MC_LOGIN_PASSWORD").context("MC_LOGIN_PASSWORD is not set")?;

    let pipeline = AuthPipeline::new(&AuthConfig::default())?;

    let xbl = pipeline
        .acquire_xbox_session(Credential::new(email, password))
        .await
        .context("Xbox Live login failed")?;
    info!(gamertag = xbl.gamertag(), "Xbox Live session acquired");

    let game = pipeline
        .acquire_game_session(&xbl, true)
        .await
        .context("Minecraft login failed")?;

    println!(
        "{} ({}) - token valid until {}",
        game.profile.name.as_deref().unwrap_or("<no name>"),
        game.profile.id,
        game.expires_at
    );

    Ok(())
}
