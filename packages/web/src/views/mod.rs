//! Route components. Each one is a thin wrapper over a view from the ui crate.

use dioxus::prelude::*;
use store::{Allergy, Appointment, IntakeLog, MedicalRecord};

use crate::Route;

#[component]
pub fn Home() -> Element {
    rsx! { ui::views::HomeView {} }
}

#[component]
pub fn Login() -> Element {
    let nav = use_navigator();
    rsx! {
        ui::views::LoginView {
            on_signed_in: move |_| {
                nav.replace(Route::Appointments {});
            },
        }
    }
}

#[component]
pub fn Appointments() -> Element {
    ui::views::entity_page::<Appointment>()
}

#[component]
pub fn Records() -> Element {
    ui::views::entity_page::<MedicalRecord>()
}

#[component]
pub fn Allergies() -> Element {
    ui::views::entity_page::<Allergy>()
}

#[component]
pub fn Logs() -> Element {
    ui::views::entity_page::<IntakeLog>()
}

#[component]
pub fn Profile() -> Element {
    rsx! { ui::views::ProfileView {} }
}
