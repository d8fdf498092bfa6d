//! Google sign-in and session helpers.

#[cfg(feature = "server")]
mod config;
#[cfg(feature = "server")]
mod google;
#[cfg(feature = "server")]
mod session;

#[cfg(feature = "server")]
pub use config::{ConfigError, GoogleConfig};
#[cfg(feature = "server")]
pub use google::{GoogleSignIn, SignInError};
#[cfg(feature = "server")]
pub use session::{require_user_id, session_user_id, SESSION_USER_ID_KEY};
