use dioxus::prelude::*;

use crate::auth::{use_auth, LoginButton};

struct Feature {
    href: &'static str,
    emoji: &'static str,
    title: &'static str,
    blurb: &'static str,
}

const FEATURES: [Feature; 4] = [
    Feature {
        href: "/appointments",
        emoji: "📅",
        title: "Appointments",
        blurb: "Keep track of upcoming and past visits.",
    },
    Feature {
        href: "/records",
        emoji: "📋",
        title: "Medical Records",
        blurb: "Diagnoses and prescriptions in one place.",
    },
    Feature {
        href: "/allergies",
        emoji: "🤧",
        title: "Allergies",
        blurb: "What you react to, how badly, and the symptoms.",
    },
    Feature {
        href: "/logs",
        emoji: "🍎",
        title: "Intake Logs",
        blurb: "Food, drinks, creams and supplements by day.",
    },
];

/// Landing page with a card per entity kind.
#[component]
pub fn HomeView() -> Element {
    let session = use_auth();
    let signed_in = session().is_signed_in();

    rsx! {
        div {
            class: "home",
            h1 { "Medicolog" }
            p { class: "home-tagline", "Your personal health log." }
            if !signed_in && !session().loading {
                LoginButton {}
            }
            div {
                class: "feature-grid",
                for feature in FEATURES.iter() {
                    a {
                        class: "feature-card",
                        href: if signed_in { feature.href } else { "/login" },
                        span { class: "feature-emoji", {feature.emoji} }
                        h2 { {feature.title} }
                        p { {feature.blurb} }
                    }
                }
            }
        }
    }
}
