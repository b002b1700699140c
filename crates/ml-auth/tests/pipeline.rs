mod common;

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use ml_auth::{AuthError, AuthPipeline, Credential, FixedClock, XstsError};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::*;

async fn mount_xbox(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/user/authenticate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_token_body()))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/xsts/authorize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(xsts_body()))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_minecraft_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/authentication/login_with_xbox"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mc_login_body()))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn full_chain_produces_game_session() {
    let server = MockServer::start().await;
    mount_login_page(&server).await;
    mount_login_redirect(&server).await;
    mount_xbox(&server).await;
    mount_minecraft_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/minecraft/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .expect(1)
        .mount(&server)
        .await;

    let now = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
    let pipeline = AuthPipeline::new(&config_for(&server))
        .unwrap()
        .with_clock(Arc::new(FixedClock::new(now)));

    let xbl = pipeline
        .acquire_xbox_session(Credential::new(EMAIL, PASSWORD))
        .await
        .unwrap();

    assert_eq!(xbl.xuid.as_deref(), Some("2535405291234567"));
    assert_eq!(xbl.user_hash, "3287554601234");
    assert_eq!(xbl.xsts_token, "xsts-token");
    assert_eq!(xbl.gamertag(), Some("Notch"));
    assert_eq!(xbl.expires_on, "2024-05-02T02:00:01.0000000Z");

    let game = pipeline.acquire_game_session(&xbl, true).await.unwrap();

    assert_eq!(game.expires_at, now + Duration::seconds(86400));
    assert_eq!(game.profile.id, MC_UUID);
    assert_eq!(game.profile.name.as_deref(), Some("Notch"));
    assert_eq!(game.profile.skins.as_ref().map(Vec::len), Some(1));
    assert_eq!(game.profile.capes.as_ref().map(Vec::len), Some(1));
    assert_eq!(game.token, "mc-access-token");
    assert_eq!(game.token_type, "Bearer");
    assert_eq!(game.metadata, json!({}));
}

#[tokio::test]
async fn game_session_without_profile_fetch_keeps_only_the_id() {
    let server = MockServer::start().await;
    mount_minecraft_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/minecraft/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .expect(0)
        .mount(&server)
        .await;

    let pipeline = AuthPipeline::new(&config_for(&server)).unwrap();
    let xbl = ml_auth::XblSession {
        xuid: None,
        user_hash: "3287554601234".to_string(),
        xsts_token: "xsts-token".to_string(),
        display_claims: ml_auth::XuiClaims {
            uhs: "3287554601234".to_string(),
            ..Default::default()
        },
        expires_on: "2024-05-02T02:00:01.0000000Z".to_string(),
    };

    let before = Utc::now();
    let game = pipeline.acquire_game_session(&xbl, false).await.unwrap();

    assert_eq!(game.profile.id, "e7b8b1f0-9c3a-4e5d-8f21-3c6b2a1d0e9f");
    assert_eq!(game.profile.name, None);
    assert_eq!(game.profile.skins, None);
    assert_eq!(game.profile.capes, None);
    assert!(game.expires_at >= before + Duration::seconds(86400));
    assert!(!game.needs_refresh());
}

#[tokio::test]
async fn interactive_login_stops_the_chain() {
    let server = MockServer::start().await;
    mount_login_page(&server).await;

    Mock::given(method("POST"))
        .and(path("/ppsecure/post.srf"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Enter code</html>"))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/user/authenticate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_token_body()))
        .expect(0)
        .mount(&server)
        .await;

    let pipeline = AuthPipeline::new(&config_for(&server)).unwrap();
    let err = pipeline
        .acquire_xbox_session(Credential::new(EMAIL, PASSWORD))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::InteractiveAuthRequired), "got {err:?}");
}

#[tokio::test]
async fn xsts_rejection_surfaces_unchanged() {
    let server = MockServer::start().await;
    mount_login_page(&server).await;
    mount_login_redirect(&server).await;

    Mock::given(method("POST"))
        .and(path("/user/authenticate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_token_body()))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/xsts/authorize"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "Identity": "0",
            "XErr": 2148916233u64,
            "Message": "",
            "Redirect": "https://start.ui.xboxlive.com/CreateAccount"
        })))
        .mount(&server)
        .await;

    let pipeline = AuthPipeline::new(&config_for(&server)).unwrap();
    let err = pipeline
        .acquire_xbox_session(Credential::new(EMAIL, PASSWORD))
        .await
        .unwrap_err();

    assert!(
        matches!(err, AuthError::XstsRejected(XstsError::NoXboxAccount)),
        "got {err:?}"
    );
}

#[tokio::test]
async fn unrepresentable_expiry_is_invalid_response() {
    let server = MockServer::start().await;

    let mut body = mc_login_body();
    body["expires_in"] = json!(10_000_000_000_000u64);
    Mock::given(method("POST"))
        .and(path("/authentication/login_with_xbox"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = AuthPipeline::new(&config_for(&server)).unwrap();
    let xbl = ml_auth::XblSession {
        xuid: None,
        user_hash: "3287554601234".to_string(),
        xsts_token: "xsts-token".to_string(),
        display_claims: ml_auth::XuiClaims {
            uhs: "3287554601234".to_string(),
            ..Default::default()
        },
        expires_on: "2024-05-02T02:00:01.0000000Z".to_string(),
    };

    let err = pipeline.acquire_game_session(&xbl, false).await.unwrap_err();

    assert!(
        matches!(&err, AuthError::InvalidResponse(msg) if msg.contains("expires_in")),
        "got {err:?}"
    );
}
