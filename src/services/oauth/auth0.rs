use oauth2::reqwest::async_http_client;
use oauth2::{
    basic::BasicClient, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken,
    PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(thiserror::Error, Debug)]
pub enum Auth0Error {
    #[error("OAuth URL construction failed: {0}")]
    UrlConstruction(String),

    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    #[error("Invalid redirect URI: {0}")]
    InvalidRedirectUri(String),

    #[error("Userinfo request failed: {0}")]
    UserInfo(String),
}

/// OpenID scopes requested at login
pub const LOGIN_SCOPES: [&str; 3] = ["openid", "profile", "email"];

/// The signed-in user as kept in the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub sub: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl CurrentUser {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.sub)
    }
}

/// Connection details for an Auth0 tenant
#[derive(Debug, Clone)]
pub struct Auth0Settings {
    pub issuer_base_url: String,
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub redirect_uri: String,
}

impl Auth0Settings {
    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.issuer_base_url.trim_end_matches('/'), path)
    }
}

fn build_oauth_client(settings: &Auth0Settings) -> Result<BasicClient, Auth0Error> {
    let redirect_url = RedirectUrl::new(settings.redirect_uri.clone())
        .map_err(|e| Auth0Error::InvalidRedirectUri(e.to_string()))?;

    let client = BasicClient::new(
        ClientId::new(settings.client_id.clone()),
        Some(ClientSecret::new(
            settings.client_secret.expose_secret().clone(),
        )),
        AuthUrl::new(settings.endpoint("/authorize"))
            .map_err(|e| Auth0Error::UrlConstruction(e.to_string()))?,
        Some(
            TokenUrl::new(settings.endpoint("/oauth/token"))
                .map_err(|e| Auth0Error::UrlConstruction(e.to_string()))?,
        ),
    )
    .set_redirect_uri(redirect_url);

    Ok(client)
}

/// Generates the Auth0 authorization URL
/// Returns (auth_url, csrf_token, pkce_verifier)
pub fn build_auth_url(settings: &Auth0Settings) -> Result<(String, String, String), Auth0Error> {
    let client = build_oauth_client(settings)?;

    let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

    let (auth_url, csrf_token) = client
        .authorize_url(CsrfToken::new_random)
        .add_scopes(LOGIN_SCOPES.iter().map(|s| Scope::new(s.to_string())))
        .set_pkce_challenge(pkce_challenge)
        .url();

    Ok((
        auth_url.to_string(),
        csrf_token.secret().clone(),
        pkce_verifier.secret().clone(),
    ))
}

/// Exchanges an authorization code for an access token
pub async fn exchange_code(
    settings: &Auth0Settings,
    code: &str,
    pkce_verifier: Option<&str>,
) -> Result<String, Auth0Error> {
    let client = build_oauth_client(settings)?;

    let mut token_request = client.exchange_code(AuthorizationCode::new(code.to_string()));

    if let Some(verifier) = pkce_verifier {
        token_request =
            token_request.set_pkce_verifier(PkceCodeVerifier::new(verifier.to_string()));
    }

    let token_response = token_request
        .request_async(async_http_client)
        .await
        .map_err(|e| Auth0Error::TokenExchange(e.to_string()))?;

    Ok(token_response.access_token().secret().clone())
}

#[derive(Deserialize)]
struct UserInfoResponse {
    sub: String,
    name: Option<String>,
    email: Option<String>,
}

/// Fetches the OIDC profile of the token holder
pub async fn fetch_user_info(
    issuer_base_url: &str,
    access_token: &str,
) -> Result<CurrentUser, Auth0Error> {
    let url = format!("{}/userinfo", issuer_base_url.trim_end_matches('/'));

    let response = reqwest::Client::new()
        .get(&url)
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| Auth0Error::UserInfo(e.to_string()))?;

    if !response.status().is_success() {
        return Err(Auth0Error::UserInfo(format!(
            "Auth0 returned {}",
            response.status()
        )));
    }

    let info: UserInfoResponse = response
        .json()
        .await
        .map_err(|e| Auth0Error::UserInfo(e.to_string()))?;

    Ok(CurrentUser {
        sub: info.sub,
        name: info.name,
        email: info.email,
    })
}

/// Builds the Auth0 logout URL that ends the tenant session and returns to `return_to`
pub fn build_logout_url(settings: &Auth0Settings, return_to: &str) -> Result<String, Auth0Error> {
    let url = Url::parse_with_params(
        &settings.endpoint("/v2/logout"),
        &[
            ("client_id", settings.client_id.as_str()),
            ("returnTo", return_to),
        ],
    )
    .map_err(|e| Auth0Error::UrlConstruction(e.to_string()))?;

    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(issuer_base_url: &str) -> Auth0Settings {
        Auth0Settings {
            issuer_base_url: issuer_base_url.to_string(),
            client_id: "test-client-id".to_string(),
            client_secret: Secret::new("test-secret".to_string()),
            redirect_uri: "http://localhost:3000/api/auth/callback".to_string(),
        }
    }

    #[test]
    fn test_build_auth_url() {
        let (auth_url, csrf_token, pkce_verifier) =
            build_auth_url(&settings("https://fleet.eu.auth0.com/")).unwrap();

        assert!(auth_url.starts_with("https://fleet.eu.auth0.com/authorize?"));
        assert!(auth_url.contains("client_id=test-client-id"));
        assert!(auth_url.contains("redirect_uri="));
        assert!(auth_url.contains("openid"));
        assert!(auth_url.contains("code_challenge="));

        assert!(!csrf_token.is_empty());
        assert!(!pkce_verifier.is_empty());
    }

    #[test]
    fn test_invalid_redirect_uri() {
        let mut settings = settings("https://fleet.eu.auth0.com");
        settings.redirect_uri = "not a valid uri!!!".to_string();

        assert!(matches!(
            build_auth_url(&settings),
            Err(Auth0Error::InvalidRedirectUri(_))
        ));
    }

    #[test]
    fn test_build_logout_url() {
        let url = build_logout_url(
            &settings("https://fleet.eu.auth0.com"),
            "http://localhost:3000/",
        )
        .unwrap();

        assert!(url.starts_with("https://fleet.eu.auth0.com/v2/logout?"));
        assert!(url.contains("client_id=test-client-id"));
        assert!(url.contains("returnTo=http%3A%2F%2Flocalhost%3A3000%2F"));
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut user = CurrentUser {
            sub: "auth0|123".to_string(),
            name: None,
            email: Some("driver@example.com".to_string()),
        };
        assert_eq!(user.display_name(), "driver@example.com");

        user.email = None;
        assert_eq!(user.display_name(), "auth0|123");
    }

    #[tokio::test]
    async fn test_fetch_user_info() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .and(header("authorization", "Bearer access-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sub": "auth0|abc",
                "name": "Fleet Manager",
                "email": "manager@example.com",
                "email_verified": true
            })))
            .mount(&server)
            .await;

        let user = fetch_user_info(&server.uri(), "access-123").await.unwrap();

        assert_eq!(
            user,
            CurrentUser {
                sub: "auth0|abc".to_string(),
                name: Some("Fleet Manager".to_string()),
                email: Some("manager@example.com".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_user_info_rejected_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let result = fetch_user_info(&server.uri(), "expired").await;
        assert!(matches!(result, Err(Auth0Error::UserInfo(_))));
    }
}
