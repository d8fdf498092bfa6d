//! Google client settings read from the environment.
//!
//! | Variable | Required | Default |
//! |----------|----------|---------|
//! | `GOOGLE_CLIENT_ID` | yes | |
//! | `GOOGLE_CLIENT_SECRET` | yes | |
//! | `AUTH_REDIRECT_URI` | no | `http://localhost:8080/auth/google/callback` |

use oauth2::{AuthUrl, ClientId, ClientSecret, RedirectUrl, TokenUrl};

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8080/auth/google/callback";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("{name} is not a valid URL: {reason}")]
    InvalidUrl { name: &'static str, reason: String },
}

/// Everything needed to build the Google OAuth client.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: ClientId,
    pub client_secret: ClientSecret,
    pub auth_url: AuthUrl,
    pub token_url: TokenUrl,
    pub redirect_url: RedirectUrl,
}

impl GoogleConfig {
    /// Read from the process environment, loading `.env` first.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &'static str| lookup(name).filter(|v| !v.trim().is_empty());
        let client_id = var("GOOGLE_CLIENT_ID").ok_or(ConfigError::Missing("GOOGLE_CLIENT_ID"))?;
        let client_secret =
            var("GOOGLE_CLIENT_SECRET").ok_or(ConfigError::Missing("GOOGLE_CLIENT_SECRET"))?;
        let redirect =
            var("AUTH_REDIRECT_URI").unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string());

        Ok(Self {
            client_id: ClientId::new(client_id),
            client_secret: ClientSecret::new(client_secret),
            auth_url: url("auth endpoint", GOOGLE_AUTH_URL.to_string(), AuthUrl::new)?,
            token_url: url("token endpoint", GOOGLE_TOKEN_URL.to_string(), TokenUrl::new)?,
            redirect_url: url("AUTH_REDIRECT_URI", redirect, RedirectUrl::new)?,
        })
    }
}

fn url<T>(
    name: &'static str,
    value: String,
    parse: impl FnOnce(String) -> Result<T, oauth2::url::ParseError>,
) -> Result<T, ConfigError> {
    parse(value).map_err(|e| ConfigError::InvalidUrl {
        name,
        reason: e.to_string(),
    })
}
