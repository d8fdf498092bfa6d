use dioxus::prelude::*;

use crate::auth::{use_auth, LoginButton};

/// Sign-in page. Once a session exists, `on_signed_in` is called.
#[component]
pub fn LoginView(on_signed_in: EventHandler<()>) -> Element {
    let session = use_auth();

    use_effect(move || {
        let state = session();
        if !state.loading && state.is_signed_in() {
            on_signed_in.call(());
        }
    });

    rsx! {
        div {
            class: "login-container",
            h1 { "Medicolog" }
            p { "Sign in to keep your health records in one place." }
            LoginButton { label: "Continue with Google", class: "login-btn google-btn" }
        }
    }
}
