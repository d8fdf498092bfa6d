//! Authentication context and hooks for the UI.

use dioxus::prelude::*;
use flows::{AuthBackend, AuthError, Identity, SessionState, SignIn};

use crate::activity_log::{log_activity, use_activity_log, LogLevel};
use crate::remote::sleep;

const SESSION_CHECK_INTERVAL: std::time::Duration = std::time::Duration::from_secs(60);

/// [`AuthBackend`] over the api server functions.
#[derive(Clone, Copy, Debug, Default)]
pub struct ApiAuth;

fn identity(user: api::UserInfo) -> Identity {
    Identity {
        id: user.id,
        display_name: user.name,
        email: Some(user.email),
        photo_url: user.avatar_url,
    }
}

impl AuthBackend for ApiAuth {
    async fn current_user(&self) -> Result<Option<Identity>, AuthError> {
        api::get_current_user()
            .await
            .map(|user| user.map(identity))
            .map_err(|e| AuthError::Network(e.to_string()))
    }

    async fn sign_in(&self) -> Result<SignIn, AuthError> {
        api::get_login_url()
            .await
            .map(SignIn::Redirect)
            .map_err(|e| AuthError::Rejected(e.to_string()))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        api::logout()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))
    }
}

/// Get the current session state.
/// Returns a signal that updates when the user logs in or out.
pub fn use_auth() -> Signal<SessionState> {
    use_context::<Signal<SessionState>>()
}

/// Provider component that manages the session.
/// Wrap your app with this component to enable authentication.
#[component]
pub fn AuthProvider(children: Element) -> Element {
    let mut session = use_signal(SessionState::default);

    // Fetch the current user on mount
    let _ = use_resource(move || async move {
        session.set(SessionState::load(&ApiAuth).await);
    });

    // Pick up sign-outs and account switches made in other tabs.
    use_effect(move || {
        spawn(async move {
            loop {
                sleep(SESSION_CHECK_INTERVAL).await;

                if session.peek().loading {
                    continue;
                }
                if let Ok(user) = ApiAuth.current_user().await {
                    if session.peek().user != user {
                        tracing::info!("session identity changed");
                        session.set(SessionState {
                            user,
                            loading: false,
                            error: None,
                        });
                    }
                }
            }
        });
    });

    use_context_provider(|| session);

    rsx! {
        {children}
    }
}

fn redirect(url: &str) {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(window) = web_sys::window() {
            let _ = window.location().set_href(url);
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    tracing::warn!(%url, "redirect requested outside the browser");
}

/// Button that starts Google sign-in.
#[component]
pub fn LoginButton(
    #[props(default = "Sign in with Google".to_string())] label: String,
    #[props(default = "".to_string())] class: String,
) -> Element {
    let mut session = use_auth();
    let mut activity = use_activity_log();
    let mut loading = use_signal(|| false);

    let onclick = move |_: MouseEvent| async move {
        loading.set(true);
        let current = session.peek().clone();
        let (next, url) = current.sign_in(&ApiAuth).await;
        if let Some(error) = &next.error {
            log_activity(&mut activity, LogLevel::Error, &format!("Sign-in failed: {error}"));
            loading.set(false);
        }
        session.set(next);
        if let Some(url) = url {
            redirect(&url);
        }
    };

    rsx! {
        div {
            button {
                class: "btn btn-primary {class}",
                disabled: loading(),
                onclick: onclick,
                if loading() {
                    "Loading..."
                } else {
                    "{label}"
                }
            }
            if let Some(error) = session().error.filter(|_| !loading()) {
                p { class: "inline-error", "{error}" }
            }
        }
    }
}

/// Button to log out the current user.
#[component]
pub fn LogoutButton(
    #[props(default = "Logout".to_string())] label: String,
    #[props(default = "".to_string())] class: String,
) -> Element {
    let mut session = use_auth();
    let mut activity = use_activity_log();

    let onclick = move |_: MouseEvent| async move {
        let current = session.peek().clone();
        let next = current.sign_out(&ApiAuth).await;
        match &next.error {
            Some(error) => {
                log_activity(&mut activity, LogLevel::Error, &format!("Sign-out failed: {error}"));
                session.set(next);
            }
            None => {
                log_activity(&mut activity, LogLevel::Info, "Signed out");
                session.set(next);
                redirect("/login");
            }
        }
    };

    rsx! {
        button {
            class: "btn {class}",
            onclick: onclick,
            "{label}"
        }
    }
}
