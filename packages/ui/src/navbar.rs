use dioxus::prelude::*;

use crate::activity_log_panel::ActivityLogToggle;
use crate::auth::use_auth;

const APP_CSS: Asset = asset!("/assets/styling/medicolog.css");

/// Top bar. Links are passed as children so the app owns its routes.
#[component]
pub fn Navbar(children: Element) -> Element {
    let session = use_auth();

    rsx! {
        document::Link { rel: "stylesheet", href: APP_CSS }
        nav {
            class: "navbar",
            span { class: "navbar-brand", "🩺 Medicolog" }
            div {
                class: "navbar-links",
                {children}
            }
            div {
                class: "navbar-user",
                if let Some(user) = session().user {
                    if let Some(photo) = user.photo_url.clone() {
                        img { class: "navbar-avatar", src: "{photo}", alt: "" }
                    }
                    span { {user.label().to_string()} }
                }
                ActivityLogToggle {}
            }
        }
    }
}
