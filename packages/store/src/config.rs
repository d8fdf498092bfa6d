//! # Application configuration: `medicolog.toml`
//!
//! Read by the server at startup (path from `MEDICOLOG_CONFIG`, default
//! [`AppConfig::filename`]) and handed to clients through a server function.
//!
//! ## Structure
//!
//! ```toml
//! [list]
//! order = "store"          # or "newest_first"
//!
//! [sync]
//! poll_interval_secs = 5   # 0 disables polling
//! ```
//!
//! Every section derives `Default`, so a missing or empty file is the default
//! configuration.

use serde::{Deserialize, Serialize};

/// Top-level configuration stored in `medicolog.toml`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub list: ListConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// How list views order their entries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListOrder {
    /// Whatever order the store delivers.
    #[default]
    Store,
    /// By the entity's date, newest first, undated entries last.
    NewestFirst,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ListConfig {
    #[serde(default)]
    pub order: ListOrder,
}

/// Realtime refresh configuration for the remote store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Poll interval in seconds. 0 disables polling.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u32,
}

/// Poll interval used when the file does not set one.
pub const DEFAULT_POLL_INTERVAL_SECS: u32 = 5;

fn default_poll_interval() -> u32 {
    DEFAULT_POLL_INTERVAL_SECS
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
        }
    }
}

impl AppConfig {
    /// Builder method to set the list order.
    pub fn with_order(mut self, order: ListOrder) -> Self {
        self.list.order = order;
        self
    }

    /// Builder method to set the poll interval.
    pub fn with_poll_interval(mut self, secs: u32) -> Self {
        self.sync.poll_interval_secs = secs;
        self
    }

    /// The well-known filename for the config file.
    pub fn filename() -> &'static str {
        "medicolog.toml"
    }

    /// Parse from TOML string.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Serialize to TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
