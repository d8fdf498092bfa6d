use dioxus::prelude::*;

use crate::auth::{use_auth, LoginButton, LogoutButton};

#[component]
pub fn ProfileView() -> Element {
    let session = use_auth();
    let state = session();

    if state.loading {
        return rsx! {
            p { class: "entity-page-status", "Loading..." }
        };
    }

    let Some(user) = state.user else {
        return rsx! {
            div {
                class: "entity-page-signed-out",
                p { "You are not signed in." }
                LoginButton {}
            }
        };
    };

    let name = user.label().to_string();
    let email = user.email.clone().unwrap_or_default();

    rsx! {
        div {
            class: "profile",
            if let Some(photo) = user.photo_url {
                img { class: "profile-avatar", src: "{photo}", alt: "{name}" }
            }
            h1 { "{name}" }
            if !email.is_empty() {
                p { class: "profile-email", "{email}" }
            }
            if let Some(error) = state.error {
                p { class: "inline-error", "{error}" }
            }
            LogoutButton { label: "Sign out" }
        }
    }
}
