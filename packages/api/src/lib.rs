//! # API crate: fullstack server functions for Medicolog
//!
//! Every public `async fn` here is a Dioxus server function, annotated with
//! `#[get(...)]` or `#[post(...)]` and compiled twice: once with the server logic
//! (behind `#[cfg(feature = "server")]`) and once as a client stub that forwards the
//! call over HTTP.
//!
//! ## Modules
//!
//! | Module | Feature gate | Purpose |
//! |--------|-------------|---------|
//! | [`auth`] | `server` | Google OAuth with PKCE, session user lookup |
//! | [`db`] | `server` | PostgreSQL pool and the owner-scoped `documents` table |
//! | [`models`] | none | `User` row and its client-safe projection [`UserInfo`] |
//!
//! ## Server functions
//!
//! - **Authentication**: `get_current_user`, `get_login_url`, `logout`
//! - **Documents**: `create_document`, `update_document`, `delete_document`,
//!   `list_documents`. Each one is scoped to the session user; the owner is never
//!   taken from the request.
//! - **Configuration**: `get_app_config`
//!
//! Document failures cross the wire as the `Display` text of a [`StoreError`];
//! [`store_error`] turns the client-side `ServerFnError` back into one.

use dioxus::prelude::*;

pub mod auth;
pub mod db;
pub mod models;

pub use models::UserInfo;
pub use store::{AppConfig, Document, StoreError, StoredDocument};

/// Get the current authenticated user from the session.
#[cfg(feature = "server")]
#[get("/api/auth/me", session: tower_sessions::Session)]
pub async fn get_current_user() -> Result<Option<UserInfo>, ServerFnError> {
    use crate::db::get_pool;
    use crate::models::User;

    let Some(user_id) = auth::session_user_id(&session).await? else {
        return Ok(None);
    };

    let pool = get_pool()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    Ok(user.map(|u| u.to_info()))
}

#[cfg(not(feature = "server"))]
#[get("/api/auth/me")]
pub async fn get_current_user() -> Result<Option<UserInfo>, ServerFnError> {
    Ok(None)
}

/// Get the Google sign-in URL.
#[cfg(feature = "server")]
#[get("/api/auth/login")]
pub async fn get_login_url() -> Result<String, ServerFnError> {
    let started = match auth::GoogleSignIn::new() {
        Ok(google) => google.start().await,
        Err(e) => Err(e),
    };
    started.map_err(|e| {
        tracing::error!(error = %e, "could not start google sign-in");
        ServerFnError::new(e.to_string())
    })
}

#[cfg(not(feature = "server"))]
#[get("/api/auth/login")]
pub async fn get_login_url() -> Result<String, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Log out the current user by clearing the session.
#[cfg(feature = "server")]
#[post("/api/auth/logout", session: tower_sessions::Session)]
pub async fn logout() -> Result<(), ServerFnError> {
    session
        .flush()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    Ok(())
}

#[cfg(not(feature = "server"))]
#[post("/api/auth/logout")]
pub async fn logout() -> Result<(), ServerFnError> {
    Ok(())
}

#[cfg(feature = "server")]
fn document_failure(e: db::documents::DocumentError) -> ServerFnError {
    let e = StoreError::from(e);
    tracing::warn!(error = %e, "document request failed");
    ServerFnError::new(e.to_string())
}

#[cfg(feature = "server")]
async fn document_pool() -> Result<&'static sqlx::PgPool, ServerFnError> {
    db::get_pool()
        .await
        .map_err(|e| ServerFnError::new(StoreError::Unavailable(e.to_string()).to_string()))
}

/// Create a document owned by the session user and return its id.
#[cfg(feature = "server")]
#[post("/api/documents/create", session: tower_sessions::Session)]
pub async fn create_document(
    collection: String,
    data: Document,
) -> Result<String, ServerFnError> {
    let owner_id = auth::require_user_id(&session).await?;
    let pool = document_pool().await?;
    let id = db::documents::insert(pool, &collection, owner_id, data)
        .await
        .map_err(document_failure)?;
    tracing::info!(%collection, %id, "document created");
    Ok(id.to_string())
}

#[cfg(not(feature = "server"))]
#[post("/api/documents/create")]
pub async fn create_document(
    collection: String,
    data: Document,
) -> Result<String, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Overwrite the fields of one of the session user's documents.
#[cfg(feature = "server")]
#[post("/api/documents/update", session: tower_sessions::Session)]
pub async fn update_document(
    collection: String,
    id: String,
    data: Document,
) -> Result<(), ServerFnError> {
    let owner_id = auth::require_user_id(&session).await?;
    let pool = document_pool().await?;
    db::documents::overwrite(pool, &collection, owner_id, &id, data)
        .await
        .map_err(document_failure)?;
    tracing::info!(%collection, %id, "document updated");
    Ok(())
}

#[cfg(not(feature = "server"))]
#[post("/api/documents/update")]
pub async fn update_document(
    collection: String,
    id: String,
    data: Document,
) -> Result<(), ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Delete one of the session user's documents.
#[cfg(feature = "server")]
#[post("/api/documents/delete", session: tower_sessions::Session)]
pub async fn delete_document(collection: String, id: String) -> Result<(), ServerFnError> {
    let owner_id = auth::require_user_id(&session).await?;
    let pool = document_pool().await?;
    db::documents::remove(pool, &collection, owner_id, &id)
        .await
        .map_err(document_failure)?;
    tracing::info!(%collection, %id, "document deleted");
    Ok(())
}

#[cfg(not(feature = "server"))]
#[post("/api/documents/delete")]
pub async fn delete_document(collection: String, id: String) -> Result<(), ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// The session user's documents in `collection`.
#[cfg(feature = "server")]
#[get("/api/documents/:collection", session: tower_sessions::Session)]
pub async fn list_documents(
    collection: String,
) -> Result<Vec<StoredDocument>, ServerFnError> {
    let owner_id = auth::require_user_id(&session).await?;
    let pool = document_pool().await?;
    db::documents::list(pool, &collection, owner_id)
        .await
        .map_err(document_failure)
}

#[cfg(not(feature = "server"))]
#[get("/api/documents/:collection")]
pub async fn list_documents(
    collection: String,
) -> Result<Vec<StoredDocument>, ServerFnError> {
    Ok(Vec::new())
}

/// Application configuration read from `MEDICOLOG_CONFIG` (default `medicolog.toml`).
#[cfg(feature = "server")]
#[get("/api/config")]
pub async fn get_app_config() -> Result<AppConfig, ServerFnError> {
    dotenvy::dotenv().ok();
    let path = std::env::var("MEDICOLOG_CONFIG")
        .unwrap_or_else(|_| AppConfig::filename().to_string());

    match tokio::fs::read_to_string(&path).await {
        Ok(text) => AppConfig::from_toml(&text).map_err(|e| {
            tracing::error!(%path, error = %e, "invalid configuration file");
            ServerFnError::new(format!("{path}: {e}"))
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ServerFnError::new(e.to_string())),
    }
}

#[cfg(not(feature = "server"))]
#[get("/api/config")]
pub async fn get_app_config() -> Result<AppConfig, ServerFnError> {
    Ok(AppConfig::default())
}

/// Recover the [`StoreError`] a document server function failed with.
pub fn store_error(e: &ServerFnError) -> StoreError {
    parse_store_error(&e.to_string())
}

/// Prefix the server function layer puts in front of the error text.
const SERVER_FN_PREFIX: &str = "error running server function:";

fn parse_store_error(message: &str) -> StoreError {
    let text = message.trim();
    let text = text
        .strip_prefix(SERVER_FN_PREFIX)
        .map(str::trim_start)
        .unwrap_or(text);

    if text == "permission denied" || text == "Not authenticated" {
        StoreError::PermissionDenied
    } else if let Some(name) = text.strip_prefix("unknown collection: ") {
        StoreError::UnknownCollection(name.to_string())
    } else if let Some(detail) = text.strip_prefix("malformed document: ") {
        StoreError::Malformed(detail.to_string())
    } else if let Some(detail) = text.strip_prefix("store unavailable: ") {
        StoreError::Unavailable(detail.to_string())
    } else if let Some(id) = not_found_id(text) {
        StoreError::NotFound(id.to_string())
    } else {
        StoreError::Unavailable(text.to_string())
    }
}

/// The id in `document <id> not found`. Ids never contain whitespace.
fn not_found_id(text: &str) -> Option<&str> {
    text.strip_prefix("document ")?
        .strip_suffix(" not found")
        .filter(|id| !id.is_empty() && !id.contains(char::is_whitespace))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_survive_the_wire() {
        for err in [
            StoreError::PermissionDenied,
            StoreError::NotFound("2f1c".into()),
            StoreError::UnknownCollection("users".into()),
            StoreError::Malformed("missing field".into()),
            StoreError::Unavailable("connection refused".into()),
        ] {
            let wire = format!("error running server function: {err}");
            assert_eq!(parse_store_error(&wire), err);
        }
    }

    #[test]
    fn test_unrecognised_message_is_unavailable() {
        assert_eq!(
            parse_store_error("request timed out"),
            StoreError::Unavailable("request timed out".into())
        );
    }

    #[test]
    fn test_unavailable_detail_mentioning_permissions_stays_unavailable() {
        let wire = "error running server function: \
            store unavailable: permission denied for table documents";
        assert_eq!(
            parse_store_error(wire),
            StoreError::Unavailable("permission denied for table documents".into())
        );
    }

    #[test]
    fn test_document_mentioned_mid_message_is_not_not_found() {
        for text in [
            "store unavailable: document 2f1c not found in replica",
            "could not reach document service",
            "document body too large",
            "document  not found",
        ] {
            assert!(
                matches!(parse_store_error(text), StoreError::Unavailable(_)),
                "{text}"
            );
        }
    }

    #[test]
    fn test_permission_denied_must_be_the_whole_message() {
        assert_eq!(
            parse_store_error("Not authenticated"),
            StoreError::PermissionDenied
        );
        assert_eq!(
            parse_store_error("upstream said permission denied"),
            StoreError::Unavailable("upstream said permission denied".into())
        );
    }
}
