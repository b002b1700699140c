#![allow(dead_code)]

use ml_auth::AuthConfig;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const EMAIL: &str = "player@example.com";
pub const PASSWORD: &str = "hunter2";
pub const FORM_TOKEN: &str = "DfR9*uXw!tok$";
pub const LIVE_ACCESS_TOKEN: &str = "EwA4A+live/token==";
pub const MC_UUID: &str = "069a79f444e94726a5befca90e38aaf5";

pub fn config_for(server: &MockServer) -> AuthConfig {
    AuthConfig::with_base_url(&server.uri())
}

/// Minimal login page carrying the two values the scraper looks for
pub fn login_page(server: &MockServer) -> String {
    format!(
        concat!(
            "<html><script>var ServerData = {{",
            r#"sFTTag:'<input type="hidden" name="PPFT" id="i0327" value="{token}"/>',"#,
            "urlPost:'{base}/ppsecure/post.srf?contextid=ABC&bk=1',",
            "iMaxStackForKnockoutAsyncComponents:10000}};</script></html>"
        ),
        token = FORM_TOKEN,
        base = server.uri()
    )
}

/// Redirect the form post answers with on success
pub fn token_redirect() -> String {
    format!(
        "https://login.live.com/oauth20_desktop.srf?lc=1033#access_token={}&token_type=bearer&expires_in=86400&scope=service::user.auth.xboxlive.com::MBI_SSL&refresh_token=M.R3_BAY.refresh&user_id=4b1f3c2d",
        "EwA4A%2Blive%2Ftoken%3D%3D"
    )
}

pub async fn mount_login_page(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/oauth20_authorize.srf"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("Set-Cookie", "MSPRequ=id=N&lt=1700000000&co=1; path=/;Secure")
                .append_header("Set-Cookie", "uaid=4f1b; domain=login.live.com; HttpOnly")
                .set_body_string(login_page(server)),
        )
        .mount(server)
        .await;
}

pub async fn mount_login_redirect(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/ppsecure/post.srf"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", token_redirect().as_str()))
        .mount(server)
        .await;
}

pub fn user_token_body() -> Value {
    json!({
        "IssueInstant": "2024-05-01T10:00:00.1234567Z",
        "NotAfter": "2024-05-15T10:00:00.1234567Z",
        "Token": "xbl-user-token",
        "DisplayClaims": { "xui": [{ "uhs": "3287554601234" }] }
    })
}

pub fn xsts_body() -> Value {
    json!({
        "IssueInstant": "2024-05-01T10:00:01.0000000Z",
        "NotAfter": "2024-05-02T02:00:01.0000000Z",
        "Token": "xsts-token",
        "DisplayClaims": {
            "xui": [
                {
                    "gtg": "Notch",
                    "xid": "2535405291234567",
                    "uhs": "3287554601234",
                    "agg": "Adult",
                    "usr": "195 234",
                    "utr": "190",
                    "prv": "185 186 187 188 191 192"
                },
                { "uhs": "9999" }
            ]
        }
    })
}

pub fn mc_login_body() -> Value {
    json!({
        "username": "e7b8b1f0-9c3a-4e5d-8f21-3c6b2a1d0e9f",
        "roles": [],
        "metadata": {},
        "access_token": "mc-access-token",
        "expires_in": 86400,
        "token_type": "Bearer"
    })
}

pub fn profile_body() -> Value {
    json!({
        "id": MC_UUID,
        "name": "Notch",
        "skins": [{
            "id": "6a6e65e5-76dd-4c3c-a625-162924514568",
            "state": "ACTIVE",
            "url": "http://textures.minecraft.net/texture/292009a4925b58f02c77dadc3ecef07ea4c7472f64e0fdc32ce5522489362680",
            "textureKey": "292009a4925b58f02c77dadc3ecef07ea4c7472f64e0fdc32ce5522489362680",
            "variant": "CLASSIC"
        }],
        "capes": [{
            "id": "2c3d4e5f-0000-4000-8000-000000000001",
            "state": "ACTIVE",
            "url": "http://textures.minecraft.net/texture/cape",
            "alias": "Migrator"
        }],
        "profileActions": {}
    })
}
