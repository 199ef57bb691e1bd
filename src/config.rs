use std::env;

use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.returnsportal.online";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT must be a valid number, got '{0}'")]
    InvalidPort(String),
}

/// Credentials for the returns API. Passed through opaquely.
#[derive(Clone, Default)]
pub struct ApiCredentials {
    pub password: String,
    pub api_key: String,
}

impl ApiCredentials {
    /// Value of the `Authorization` header sent on every call.
    pub fn authorization(&self) -> String {
        format!(
            "Bearer token=\"{}\", api_key=\"{}\"",
            self.password, self.api_key
        )
    }
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("password", &"<redacted>")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub credentials: ApiCredentials,
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Read configuration from the process environment (after `.env` has
    /// been loaded). Every setting is optional.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = var("RETURNS_BASE_URL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| {
                log::info!("RETURNS_BASE_URL not set, using {}", DEFAULT_BASE_URL);
                DEFAULT_BASE_URL.to_string()
            });
        let credentials = ApiCredentials {
            password: var("RETURNS_PASSWORD").unwrap_or_default(),
            api_key: var("RETURNS_API_KEY").unwrap_or_default(),
        };
        if credentials.password.is_empty() || credentials.api_key.is_empty() {
            log::warn!("Returns API credentials are incomplete; remote calls will likely be rejected");
        }

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match var("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => 8080,
        };

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            host,
            port,
        })
    }
}
