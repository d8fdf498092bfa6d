//! Session keys and lookups shared by every server function.

use dioxus::prelude::ServerFnError;
use tower_sessions::Session;
use uuid::Uuid;

/// Key for storing user ID in session.
pub const SESSION_USER_ID_KEY: &str = "user_id";

/// The signed-in user's id, or `None` for an anonymous session.
pub async fn session_user_id(session: &Session) -> Result<Option<Uuid>, ServerFnError> {
    let user_id: Option<String> = session
        .get(SESSION_USER_ID_KEY)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    user_id
        .map(|id| Uuid::parse_str(&id).map_err(|e| ServerFnError::new(e.to_string())))
        .transpose()
}

/// Like [`session_user_id`], but an anonymous session is an error.
pub async fn require_user_id(session: &Session) -> Result<Uuid, ServerFnError> {
    session_user_id(session)
        .await?
        .ok_or_else(|| ServerFnError::new("Not authenticated"))
}
