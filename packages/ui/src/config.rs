//! Application configuration and the shared document store, as UI context.

use dioxus::prelude::*;
use store::AppConfig;

use crate::remote::RemoteStore;

pub fn use_app_config() -> Signal<AppConfig> {
    use_context::<Signal<AppConfig>>()
}

/// The store every page reads and writes through.
pub fn use_store() -> RemoteStore {
    use_context::<RemoteStore>()
}

/// Loads `medicolog.toml` from the server and provides it together with the
/// [`RemoteStore`]. Until the load completes the defaults apply.
#[component]
pub fn ConfigProvider(children: Element) -> Element {
    let mut config = use_signal(AppConfig::default);
    let remote = use_context_provider(RemoteStore::default);
    use_context_provider(|| config);

    let _ = use_resource(move || {
        let remote = remote.clone();
        async move {
            match api::get_app_config().await {
                Ok(loaded) => {
                    tracing::debug!(?loaded, "configuration loaded");
                    remote.set_poll_interval(loaded.sync.poll_interval_secs);
                    config.set(loaded);
                }
                Err(e) => tracing::warn!(error = %e, "using default configuration"),
            }
        }
    });

    rsx! {
        {children}
    }
}
