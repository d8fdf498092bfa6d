//! # Signing in with Google
//!
//! Google is the only identity provider. A sign-in has two legs:
//!
//! 1. [`GoogleSignIn::start`] builds the consent URL with a PKCE challenge and parks the
//!    CSRF state and verifier in `oauth_states` for [`STATE_TTL_MINUTES`].
//! 2. [`GoogleSignIn::finish`] runs in the `/auth/google/callback` route. It takes the
//!    parked verifier back (one use, unexpired), trades the code for an access token,
//!    reads the Google profile and upserts the `users` row.
//!
//! The row's id is what the session stores and what owns every document, so it is
//! returned as a [`UserInfo`].

use oauth2::basic::BasicClient;
use oauth2::{
    AuthorizationCode, CsrfToken, EndpointNotSet, EndpointSet, PkceCodeChallenge,
    PkceCodeVerifier, Scope, TokenResponse,
};
use serde::Deserialize;
use sqlx::PgPool;

use super::config::{ConfigError, GoogleConfig};
use crate::db::get_pool;
use crate::models::{User, UserInfo};

const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
const SCOPES: [&str; 3] = ["openid", "email", "profile"];

/// How long a consent URL stays redeemable.
pub const STATE_TTL_MINUTES: i32 = 10;

#[derive(Debug, thiserror::Error)]
pub enum SignInError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("sign-in link expired or already used")]
    UnknownState,
    #[error("token exchange failed: {0}")]
    Token(String),
    #[error("could not read Google profile: {0}")]
    Profile(#[from] reqwest::Error),
}

impl SignInError {
    /// Short code put on the `/login?error=` redirect.
    pub fn code(&self) -> &'static str {
        match self {
            SignInError::Config(_) => "config_error",
            SignInError::Database(_) => "database_error",
            SignInError::UnknownState => "expired_link",
            SignInError::Token(_) | SignInError::Profile(_) => "oauth_error",
        }
    }
}

type GoogleClient = oauth2::Client<
    oauth2::basic::BasicErrorResponse,
    oauth2::basic::BasicTokenResponse,
    oauth2::basic::BasicTokenIntrospectionResponse,
    oauth2::StandardRevocableToken,
    oauth2::basic::BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

/// Profile fields read from the userinfo endpoint.
#[derive(Debug, Deserialize)]
struct GoogleProfile {
    id: String,
    email: String,
    name: Option<String>,
    picture: Option<String>,
}

impl GoogleProfile {
    /// Google sends empty strings for fields the user has hidden.
    fn normalized(self) -> Self {
        let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Self {
            name: present(self.name),
            picture: present(self.picture),
            ..self
        }
    }
}

/// A consent URL and the secrets that must be parked until the callback.
struct Consent {
    url: String,
    state: String,
    verifier: String,
}

pub struct GoogleSignIn {
    client: GoogleClient,
}

impl GoogleSignIn {
    pub fn new() -> Result<Self, SignInError> {
        Ok(Self::with_config(GoogleConfig::from_env()?))
    }

    pub fn with_config(config: GoogleConfig) -> Self {
        let client = BasicClient::new(config.client_id)
            .set_client_secret(config.client_secret)
            .set_auth_uri(config.auth_url)
            .set_token_uri(config.token_url)
            .set_redirect_uri(config.redirect_url);
        Self { client }
    }

    fn consent(&self) -> Consent {
        let (challenge, verifier) = PkceCodeChallenge::new_random_sha256();
        let (url, state) = self
            .client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(SCOPES.map(|s| Scope::new(s.to_string())))
            .set_pkce_challenge(challenge)
            .url();
        Consent {
            url: url.to_string(),
            state: state.secret().clone(),
            verifier: verifier.secret().clone(),
        }
    }

    /// Consent URL to send the browser to.
    pub async fn start(&self) -> Result<String, SignInError> {
        let consent = self.consent();
        let pool = get_pool().await?;
        sqlx::query(
            r#"
            INSERT INTO oauth_states (state, provider, pkce_verifier, expires_at)
            VALUES ($1, 'google', $2, NOW() + make_interval(mins => $3))
            "#,
        )
        .bind(&consent.state)
        .bind(&consent.verifier)
        .bind(STATE_TTL_MINUTES)
        .execute(pool)
        .await?;

        tracing::debug!("parked google sign-in state");
        Ok(consent.url)
    }

    /// Complete the callback for `code` and `state`, returning the signed-in user.
    pub async fn finish(&self, code: &str, state: &str) -> Result<UserInfo, SignInError> {
        let pool = get_pool().await?;
        let verifier = take_verifier(pool, state).await?;

        let http = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        let token = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_pkce_verifier(PkceCodeVerifier::new(verifier))
            .request_async(&http)
            .await
            .map_err(|e| SignInError::Token(e.to_string()))?;

        let profile: GoogleProfile = http
            .get(USERINFO_URL)
            .bearer_auth(token.access_token().secret())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let user = upsert_user(pool, profile.normalized()).await?;
        tracing::info!(user = %user.id, "google sign-in complete");
        Ok(user.to_info())
    }
}

/// Remove the parked verifier for `state`. Expired or reused states yield nothing.
async fn take_verifier(pool: &PgPool, state: &str) -> Result<String, SignInError> {
    let row: Option<(String,)> = sqlx::query_as(
        r#"
        DELETE FROM oauth_states
        WHERE state = $1 AND provider = 'google' AND expires_at > NOW()
        RETURNING pkce_verifier
        "#,
    )
    .bind(state)
    .fetch_optional(pool)
    .await?;
    row.map(|(verifier,)| verifier)
        .ok_or(SignInError::UnknownState)
}

/// Returning users get their profile refreshed.
async fn upsert_user(pool: &PgPool, profile: GoogleProfile) -> Result<User, SignInError> {
    let user: User = sqlx::query_as(
        r#"
        INSERT INTO users (email, name, avatar_url, provider, provider_id)
        VALUES ($1, $2, $3, 'google', $4)
        ON CONFLICT (provider, provider_id)
        DO UPDATE SET
            email = EXCLUDED.email,
            name = EXCLUDED.name,
            avatar_url = EXCLUDED.avatar_url,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(&profile.email)
    .bind(&profile.name)
    .bind(&profile.picture)
    .bind(&profile.id)
    .fetch_one(pool)
    .await?;
    Ok(user)
}
