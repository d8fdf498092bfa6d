//! Who is signed in, and the transitions between signed in and signed out.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// The authenticated user. `id` is the owner id stamped on every entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
}

impl Identity {
    /// Display name, falling back to the email, then to a generic label.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or("Signed in")
    }
}

/// Result of starting a sign-in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignIn {
    /// Continue at the identity provider; the session completes on return.
    Redirect(String),
    /// Signed in without leaving the page.
    Complete(Identity),
}

/// The hosted identity provider.
pub trait AuthBackend {
    fn current_user(&self) -> impl Future<Output = Result<Option<Identity>, AuthError>>;

    fn sign_in(&self) -> impl Future<Output = Result<SignIn, AuthError>>;

    fn sign_out(&self) -> impl Future<Output = Result<(), AuthError>>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionState {
    pub user: Option<Identity>,
    pub loading: bool,
    pub error: Option<AuthError>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
            error: None,
        }
    }
}

impl SessionState {
    /// Owner id for reads and writes, if signed in.
    pub fn owner_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    /// Resolve the current user. A failed lookup is treated as signed out.
    pub async fn load<B: AuthBackend>(backend: &B) -> Self {
        match backend.current_user().await {
            Ok(user) => Self {
                user,
                loading: false,
                error: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, "could not resolve current user");
                Self {
                    user: None,
                    loading: false,
                    error: Some(e),
                }
            }
        }
    }

    /// Start a sign-in. Returns the next state and, for redirect flows, the URL to visit.
    pub async fn sign_in<B: AuthBackend>(&self, backend: &B) -> (Self, Option<String>) {
        match backend.sign_in().await {
            Ok(SignIn::Redirect(url)) => (
                Self {
                    loading: true,
                    error: None,
                    ..self.clone()
                },
                Some(url),
            ),
            Ok(SignIn::Complete(user)) => {
                tracing::info!(user = %user.id, "signed in");
                (
                    Self {
                        user: Some(user),
                        loading: false,
                        error: None,
                    },
                    None,
                )
            }
            Err(e) => {
                tracing::warn!(error = %e, "sign-in failed");
                (
                    Self {
                        loading: false,
                        error: Some(e),
                        ..self.clone()
                    },
                    None,
                )
            }
        }
    }

    /// Sign out. On failure the user stays signed in and the error is kept.
    pub async fn sign_out<B: AuthBackend>(&self, backend: &B) -> Self {
        match backend.sign_out().await {
            Ok(()) => {
                tracing::info!("signed out");
                Self {
                    user: None,
                    loading: false,
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "sign-out failed");
                Self {
                    error: Some(e),
                    ..self.clone()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeAuth {
        user: RefCell<Option<Identity>>,
        fail: Option<AuthError>,
        redirect: bool,
    }

    fn alice() -> Identity {
        Identity {
            id: "alice".into(),
            display_name: Some("Alice".into()),
            email: Some("alice@example.com".into()),
            photo_url: None,
        }
    }

    impl AuthBackend for FakeAuth {
        async fn current_user(&self) -> Result<Option<Identity>, AuthError> {
            match &self.fail {
                Some(e) => Err(e.clone()),
                None => Ok(self.user.borrow().clone()),
            }
        }

        async fn sign_in(&self) -> Result<SignIn, AuthError> {
            if let Some(e) = &self.fail {
                return Err(e.clone());
            }
            if self.redirect {
                return Ok(SignIn::Redirect("https://accounts.example.com/auth".into()));
            }
            *self.user.borrow_mut() = Some(alice());
            Ok(SignIn::Complete(alice()))
        }

        async fn sign_out(&self) -> Result<(), AuthError> {
            if let Some(e) = &self.fail {
                return Err(e.clone());
            }
            *self.user.borrow_mut() = None;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_sign_in_then_out() {
        let auth = FakeAuth::default();
        let state = SessionState::load(&auth).await;
        assert!(!state.loading);
        assert_eq!(state.owner_id(), None);

        let (state, redirect) = state.sign_in(&auth).await;
        assert!(redirect.is_none());
        assert_eq!(state.owner_id(), Some("alice"));

        let state = state.sign_out(&auth).await;
        assert!(!state.is_signed_in());
    }

    #[tokio::test]
    async fn test_redirect_sign_in() {
        let auth = FakeAuth {
            redirect: true,
            ..Default::default()
        };
        let state = SessionState::load(&auth).await;
        let (state, redirect) = state.sign_in(&auth).await;
        assert!(redirect.unwrap().starts_with("https://"));
        assert!(!state.is_signed_in());
    }

    #[tokio::test]
    async fn test_failed_sign_out_keeps_user() {
        let state = SessionState {
            user: Some(alice()),
            loading: false,
            error: None,
        };
        let auth = FakeAuth {
            fail: Some(AuthError::Network("offline".into())),
            ..Default::default()
        };
        let state = state.sign_out(&auth).await;
        assert_eq!(state.owner_id(), Some("alice"));
        assert_eq!(state.error, Some(AuthError::Network("offline".into())));
    }

    #[tokio::test]
    async fn test_failed_sign_in_stays_signed_out() {
        let auth = FakeAuth {
            fail: Some(AuthError::Rejected("popup closed".into())),
            ..Default::default()
        };
        let state = SessionState {
            loading: false,
            ..Default::default()
        };
        let (state, _) = state.sign_in(&auth).await;
        assert!(!state.is_signed_in());
        assert!(matches!(state.error, Some(AuthError::Rejected(_))));
    }

    #[test]
    fn test_label_falls_back_to_email() {
        let mut user = alice();
        user.display_name = None;
        assert_eq!(user.label(), "alice@example.com");
    }
}
