use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use reqwest::header::{COOKIE, HeaderMap, LOCATION, SET_COOKIE};
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::{AuthConfig, LoginParams, official};
use crate::credential::Credential;
use crate::errors::{AuthError, Result};
use crate::session::{LiveToken, PreAuthContext};

static FORM_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"sFTTag:'.*value="(.*)"/>'"#).expect("valid PPFT pattern"));

static POST_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"urlPost:'([^']+)'").expect("valid urlPost pattern"));

/// Signs a Microsoft account in through the login.live.com web form
#[derive(Debug, Clone)]
pub struct LiveAuthenticator {
    http: Client,
    authorize_url: String,
    login: LoginParams,
}

impl LiveAuthenticator {
    /// `http` must not follow redirects, see [`AuthConfig::build_http_client`]
    pub fn new(http: Client, config: &AuthConfig) -> Self {
        Self {
            http,
            authorize_url: config.endpoints.live_authorize.clone(),
            login: config.login.clone(),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        Ok(Self::new(config.build_http_client()?, config))
    }

    /// Build the implicit-flow authorize URL
    pub fn authorize_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.authorize_url)?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.login.client_id)
            .append_pair("redirect_uri", &self.login.redirect_uri)
            .append_pair("response_type", official::RESPONSE_TYPE)
            .append_pair("scope", &self.login.scope);
        Ok(url)
    }

    /// Load the login page and scrape what the form post needs
    #[instrument(skip(self))]
    pub async fn pre_authenticate(&self) -> Result<PreAuthContext> {
        let url = self.authorize_url()?;

        debug!("Fetching login page");
        let response = self.http.get(url).send().await?;

        if !response.status().is_success() {
            return Err(AuthError::from_response(response).await);
        }

        let cookie = join_cookies(response.headers());
        let body = response.text().await?;
        let (form_token, post_url) = scrape_login_page(&body)?;

        Ok(PreAuthContext {
            cookie,
            form_token,
            post_url,
        })
    }

    /// Exchange an email and password for a Microsoft access token
    #[instrument(skip(self, credential))]
    pub async fn authenticate(&self, credential: Credential) -> Result<LiveToken> {
        let context = self.pre_authenticate().await?;
        self.submit_credentials(context, credential).await
    }

    /// Post the login form for a freshly scraped page
    #[instrument(skip_all)]
    pub async fn submit_credentials(
        &self,
        context: PreAuthContext,
        credential: Credential,
    ) -> Result<LiveToken> {
        let form = [
            ("login", credential.email()),
            ("loginfmt", credential.email()),
            ("passwd", credential.password()),
            ("PPFT", context.form_token.as_str()),
        ];

        debug!("Submitting login form");
        let mut request = self.http.post(&context.post_url).form(&form);
        if !context.cookie.is_empty() {
            request = request.header(COOKIE, &context.cookie);
        }
        let response = request.send().await?;
        drop(credential);

        // Microsoft re-renders the form for bad passwords and second-factor prompts alike
        if response.status() == StatusCode::OK {
            warn!("Login form was served again instead of redirecting");
            return Err(AuthError::InteractiveAuthRequired);
        }

        let location = response
            .headers()
            .get(LOCATION)
            .ok_or(AuthError::MissingRedirect)?
            .to_str()
            .map_err(|_| AuthError::InvalidResponse("Non-ASCII Location header".to_string()))?;

        parse_token_fragment(location)
    }
}

/// `name=value` part of every `Set-Cookie` header, joined with `"; "`
fn join_cookies(headers: &HeaderMap) -> String {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| match value.to_str() {
            Ok(cookie) => Some(cookie),
            Err(_) => {
                debug!("Dropping Set-Cookie header with non-visible-ASCII bytes");
                None
            }
        })
        .filter_map(|cookie| cookie.split(';').next())
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Pull the PPFT value and the form post URL out of the login page
fn scrape_login_page(body: &str) -> Result<(String, String)> {
    let form_token = FORM_TOKEN
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| AuthError::Protocol("PPFT not found on login page".to_string()))?;

    let post_url = POST_URL
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| AuthError::Protocol("urlPost not found on login page".to_string()))?;

    Ok((form_token, post_url))
}

/// Decode the token carried in the fragment of the final redirect
fn parse_token_fragment(location: &str) -> Result<LiveToken> {
    let Some((head, fragment)) = location.split_once('#') else {
        let query = location.split_once('?').map(|(_, q)| q).unwrap_or_default();
        let params = decode_pairs(query);
        return Err(redirect_error(&params).unwrap_or_else(|| {
            AuthError::InvalidResponse("Redirect carried no token".to_string())
        }));
    };
    debug!(redirect = head, "Parsing token from redirect fragment");

    let mut params = decode_pairs(fragment);
    if let Some(err) = redirect_error(&params) {
        return Err(err);
    }

    let access_token = params
        .remove("access_token")
        .ok_or_else(|| {
            AuthError::InvalidResponse("Redirect fragment has no access_token".to_string())
        })?;
    let expires_in = params
        .remove("expires_in")
        .ok_or_else(|| {
            AuthError::InvalidResponse("Redirect fragment has no expires_in".to_string())
        })?
        .parse::<u64>()
        .map_err(|e| AuthError::InvalidResponse(format!("Invalid expires_in: {}", e)))?;

    Ok(LiveToken {
        access_token,
        token_type: params.remove("token_type").unwrap_or_default(),
        expires_in,
        scope: params.remove("scope").unwrap_or_default(),
        refresh_token: params.remove("refresh_token").unwrap_or_default(),
        user_id: params.remove("user_id").unwrap_or_default(),
    })
}

fn decode_pairs(input: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(input.as_bytes())
        .into_owned()
        .collect()
}

fn redirect_error(params: &HashMap<String, String>) -> Option<AuthError> {
    let error = params.get("error")?;
    let description = params
        .get("error_description")
        .map(String::as_str)
        .unwrap_or("no description");
    Some(AuthError::InvalidResponse(format!("{}: {}", error, description)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    const LOGIN_PAGE: &str = concat!(
        "<script>var ServerData = {",
        r#"sFTTag:'<input type="hidden" name="PPFT" id="i0327" value="Dd3!token*value$"/>',"#,
        "urlPost:'https://login.live.com/ppsecure/post.srf?contextid=ABC&bk=1',",
        "iMaxStackForKnockoutAsyncComponents:10000};</script>"
    );

    #[test]
    fn scrapes_form_token_and_post_url() {
        let (token, url) = scrape_login_page(LOGIN_PAGE).unwrap();
        assert_eq!(token, "Dd3!token*value$");
        assert_eq!(url, "https://login.live.com/ppsecure/post.srf?contextid=ABC&bk=1");
    }

    #[test]
    fn missing_patterns_are_protocol_errors() {
        let err = scrape_login_page("<html>maintenance</html>").unwrap_err();
        assert!(matches!(err, AuthError::Protocol(_)));

        let only_token = r#"sFTTag:'<input name="PPFT" value="abc"/>'"#;
        let err = scrape_login_page(only_token).unwrap_err();
        assert!(matches!(err, AuthError::Protocol(msg) if msg.contains("urlPost")));
    }

    #[test]
    fn cookies_keep_only_name_value_pairs() {
        let mut headers = HeaderMap::new();
        headers.append(
            SET_COOKIE,
            HeaderValue::from_static("MSPRequ=id=N&lt=1; path=/;Secure"),
        );
        headers.append(
            SET_COOKIE,
            HeaderValue::from_static("uaid=1234; domain=login.live.com; HttpOnly"),
        );

        assert_eq!(join_cookies(&headers), "MSPRequ=id=N&lt=1; uaid=1234");
        assert_eq!(join_cookies(&HeaderMap::new()), "");
    }

    #[test]
    fn opaque_cookie_bytes_are_skipped() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_bytes(b"MSPOK=\xfe\xff; path=/").unwrap());
        headers.append(SET_COOKIE, HeaderValue::from_static("uaid=1234; HttpOnly"));

        assert_eq!(join_cookies(&headers), "uaid=1234");
    }

    #[test]
    fn parses_token_from_fragment() {
        let location = "https://login.live.com/oauth20_desktop.srf?lc=1033#access_token=EwA%2Bxyz&token_type=bearer&expires_in=86400&scope=service::user.auth.xboxlive.com::MBI_SSL&refresh_token=M.R3_BAY&user_id=a1b2c3";
        let token = parse_token_fragment(location).unwrap();

        assert_eq!(token.access_token, "EwA+xyz");
        assert_eq!(token.token_type, "bearer");
        assert_eq!(token.expires_in, 86400);
        assert_eq!(token.scope, "service::user.auth.xboxlive.com::MBI_SSL");
        assert_eq!(token.refresh_token, "M.R3_BAY");
        assert_eq!(token.user_id, "a1b2c3");
    }

    #[test]
    fn non_numeric_expiry_is_rejected() {
        let err = parse_token_fragment("https://x/#access_token=a&expires_in=soon").unwrap_err();
        assert!(matches!(err, AuthError::InvalidResponse(_)));
    }

    #[test]
    fn provider_error_is_reported() {
        let err = parse_token_fragment(
            "https://login.live.com/oauth20_desktop.srf?error=access_denied&error_description=The+user+has+denied+access",
        )
        .unwrap_err();
        assert!(
            matches!(err, AuthError::InvalidResponse(msg) if msg == "access_denied: The user has denied access")
        );
    }
}
