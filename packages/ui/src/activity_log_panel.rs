//! Bottom panel listing recent activity, filterable by collection.

use dioxus::prelude::*;

use crate::activity_log::{use_activity_log, LogEntry, LogLevel};

const ACTIVITY_LOG_CSS: Asset = asset!("/assets/styling/activity_log.css");

fn level_class(level: &LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "activity-log-entry error",
        LogLevel::Warning => "activity-log-entry warning",
        LogLevel::Success => "activity-log-entry success",
        LogLevel::Info => "activity-log-entry info",
    }
}

#[component]
pub fn ActivityLogPanel() -> Element {
    let mut log = use_activity_log();

    let snapshot = log();
    if !snapshot.visible {
        return rsx! {};
    }
    let scopes = snapshot.scopes();
    let filter = snapshot.filter;
    let entries = snapshot.visible_entries();

    rsx! {
        document::Stylesheet { href: ACTIVITY_LOG_CSS }

        div {
            class: "activity-log-panel",
            div {
                class: "activity-log-header",
                span { "Activity" }
                div {
                    class: "activity-log-filters",
                    button {
                        class: if filter.is_none() { "filter active" } else { "filter" },
                        onclick: move |_| log.write().filter = None,
                        "All"
                    }
                    for scope in scopes {
                        button {
                            key: "{scope}",
                            class: if filter == Some(scope) { "filter active" } else { "filter" },
                            onclick: move |_| log.write().filter = Some(scope),
                            "{scope}"
                        }
                    }
                }
                div {
                    class: "activity-log-header-actions",
                    button {
                        onclick: move |_| log.write().clear_visible(),
                        "Clear"
                    }
                    button {
                        onclick: move |_| log.write().visible = false,
                        "Close"
                    }
                }
            }
            div {
                class: "activity-log-entries",
                if entries.is_empty() {
                    div { class: "activity-log-empty", "Nothing yet." }
                }
                for entry in entries {
                    {entry_row(entry)}
                }
            }
        }
    }
}

fn entry_row(entry: LogEntry) -> Element {
    let scope = entry.scope.unwrap_or("session");
    rsx! {
        div {
            class: level_class(&entry.level),
            span { class: "activity-log-time", "{entry.timestamp}" }
            span { class: "activity-log-scope", "{scope}" }
            span { " {entry.message}" }
        }
    }
}

/// Navbar button showing the number of failed actions, or the entry count.
#[component]
pub fn ActivityLogToggle() -> Element {
    let mut log = use_activity_log();
    let snapshot = log();
    let errors = snapshot.error_count();
    let count = snapshot.entries.len();

    rsx! {
        button {
            class: if errors > 0 { "activity-log-toggle has-errors" } else { "activity-log-toggle" },
            onclick: move |_| {
                let visible = log.peek().visible;
                log.write().visible = !visible;
            },
            title: "Activity log",
            if errors > 0 {
                "{errors} failed"
            } else if count > 0 {
                "{count}"
            } else {
                "Log"
            }
        }
    }
}
