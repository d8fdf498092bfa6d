//! This crate contains all shared UI for the workspace.

pub use dioxus_free_icons::Icon;
pub mod icons {
    pub use dioxus_free_icons::icons::fa_solid_icons::*;
}

pub mod views;

mod navbar;
pub use navbar::Navbar;

mod auth;
pub use auth::{use_auth, ApiAuth, AuthProvider, LoginButton, LogoutButton};

mod config;
pub use config::{use_app_config, use_store, ConfigProvider};

mod remote;
pub use remote::RemoteStore;

pub mod activity_log;
pub use activity_log::{
    log_activity, log_activity_in, use_activity_log, ActivityLog, LogLevel,
};

mod activity_log_panel;
pub use activity_log_panel::{ActivityLogPanel, ActivityLogToggle};
