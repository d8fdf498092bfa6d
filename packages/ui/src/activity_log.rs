use dioxus::prelude::*;

#[derive(Clone, Debug, PartialEq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
    /// Collection the entry came from, `None` for session events.
    pub scope: Option<&'static str>,
}

#[derive(Clone, Debug, Default)]
pub struct ActivityLog {
    pub entries: Vec<LogEntry>,
    pub visible: bool,
    /// Only entries from this collection are shown when set.
    pub filter: Option<&'static str>,
}

impl ActivityLog {
    /// Entries kept before the oldest are dropped.
    pub const CAPACITY: usize = 200;

    pub fn push(
        &mut self,
        scope: Option<&'static str>,
        level: LogLevel,
        message: &str,
        timestamp: String,
    ) {
        if self.entries.len() == Self::CAPACITY {
            self.entries.remove(0);
        }
        self.entries.push(LogEntry {
            timestamp,
            level,
            message: message.to_string(),
            scope,
        });
    }

    pub fn error_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.level == LogLevel::Error)
            .count()
    }

    /// Collections that have logged something, in first-seen order.
    pub fn scopes(&self) -> Vec<&'static str> {
        let mut scopes = Vec::new();
        for scope in self.entries.iter().filter_map(|e| e.scope) {
            if !scopes.contains(&scope) {
                scopes.push(scope);
            }
        }
        scopes
    }

    /// Entries passing the current filter, newest first.
    pub fn visible_entries(&self) -> Vec<LogEntry> {
        self.entries
            .iter()
            .rev()
            .filter(|e| self.filter.is_none() || e.scope == self.filter)
            .cloned()
            .collect()
    }

    /// Drop the entries the current filter shows.
    pub fn clear_visible(&mut self) {
        match self.filter.take() {
            Some(scope) => self.entries.retain(|e| e.scope != Some(scope)),
            None => self.entries.clear(),
        }
    }
}

pub fn use_activity_log() -> Signal<ActivityLog> {
    use_context::<Signal<ActivityLog>>()
}

pub fn log_activity(log: &mut Signal<ActivityLog>, level: LogLevel, message: &str) {
    record(log, None, level, message);
}

/// Log an event raised while working on `collection`.
pub fn log_activity_in(
    log: &mut Signal<ActivityLog>,
    collection: &'static str,
    level: LogLevel,
    message: &str,
) {
    record(log, Some(collection), level, message);
}

fn record(
    log: &mut Signal<ActivityLog>,
    scope: Option<&'static str>,
    level: LogLevel,
    message: &str,
) {
    let collection = scope.unwrap_or("session");
    match level {
        LogLevel::Error => tracing::error!(collection, "{message}"),
        LogLevel::Warning => tracing::warn!(collection, "{message}"),
        LogLevel::Info | LogLevel::Success => tracing::info!(collection, "{message}"),
    }
    log.write().push(scope, level, message, current_time());
}

fn current_time() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_is_bounded() {
        let mut log = ActivityLog::default();
        for i in 0..ActivityLog::CAPACITY + 5 {
            log.push(None, LogLevel::Info, &format!("entry {i}"), String::new());
        }
        assert_eq!(log.entries.len(), ActivityLog::CAPACITY);
        assert_eq!(log.entries[0].message, "entry 5");
    }

    #[test]
    fn test_error_count() {
        let mut log = ActivityLog::default();
        log.push(None, LogLevel::Warning, "slow", String::new());
        assert_eq!(log.error_count(), 0);
        log.push(Some("allergies"), LogLevel::Error, "failed", String::new());
        assert_eq!(log.error_count(), 1);
    }

    fn sample() -> ActivityLog {
        let mut log = ActivityLog::default();
        log.push(None, LogLevel::Info, "Signed in", String::new());
        log.push(Some("allergies"), LogLevel::Success, "Added allergy", String::new());
        log.push(Some("appointments"), LogLevel::Error, "Offline", String::new());
        log.push(Some("allergies"), LogLevel::Success, "Deleted allergy", String::new());
        log
    }

    #[test]
    fn test_scopes_in_first_seen_order() {
        assert_eq!(sample().scopes(), ["allergies", "appointments"]);
    }

    #[test]
    fn test_filter_shows_one_collection_newest_first() {
        let mut log = sample();
        assert_eq!(log.visible_entries().len(), 4);

        log.filter = Some("allergies");
        let messages: Vec<_> = log.visible_entries().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, ["Deleted allergy", "Added allergy"]);
    }

    #[test]
    fn test_clear_visible_keeps_other_collections() {
        let mut log = sample();
        log.filter = Some("allergies");
        log.clear_visible();
        assert_eq!(log.filter, None);
        assert_eq!(log.entries.len(), 2);
        assert_eq!(log.scopes(), ["appointments"]);

        log.clear_visible();
        assert!(log.entries.is_empty());
    }
}
