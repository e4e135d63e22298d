use secrecy::Secret;
use serde::Deserialize;

use crate::services::oauth::auth0::Auth0Settings;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub base_url: String,
    pub host: String,
    pub port: u16,

    // Auth0 tenant (OIDC login)
    pub auth0_issuer_base_url: String,
    pub auth0_client_id: String,
    pub auth0_client_secret: Secret<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        // Load .env file if it exists (for local development)
        let _ = dotenvy::dotenv();

        let config = config::Config::builder()
            .add_source(config::Environment::default().separator("__"))
            .build()?;

        Ok(Self {
            database_url: config.get("database_url")?,
            base_url: config.get("base_url")?,
            host: config.get("host").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: config.get("port").unwrap_or(3000),

            auth0_issuer_base_url: config.get("auth0_issuer_base_url")?,
            auth0_client_id: config.get("auth0_client_id")?,
            auth0_client_secret: Secret::new(config.get("auth0_client_secret")?),
        })
    }

    /// Session cookies are only marked secure when served over https
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    pub fn auth0(&self) -> Auth0Settings {
        Auth0Settings {
            issuer_base_url: self.auth0_issuer_base_url.clone(),
            client_id: self.auth0_client_id.clone(),
            client_secret: self.auth0_client_secret.clone(),
            redirect_uri: format!(
                "{}/api/auth/callback",
                self.base_url.trim_end_matches('/')
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> Config {
        Config {
            database_url: "postgres://localhost/fleetmate".to_string(),
            base_url: base_url.to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            auth0_issuer_base_url: "https://fleet.eu.auth0.com".to_string(),
            auth0_client_id: "client".to_string(),
            auth0_client_secret: Secret::new("secret".to_string()),
        }
    }

    #[test]
    fn test_auth0_redirect_uri() {
        let settings = config("http://localhost:3000/").auth0();
        assert_eq!(
            settings.redirect_uri,
            "http://localhost:3000/api/auth/callback"
        );
    }

    #[test]
    fn test_secure_cookies() {
        assert!(config("https://fleet.example.com").secure_cookies());
        assert!(!config("http://localhost:3000").secure_cookies());
    }
}
