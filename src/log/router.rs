//! Category-tagged log with per-category visibility.
//!
//! The router keeps an ordered, unbounded history. Visibility only filters
//! what is displayed; hiding a category never discards entries.
//!
//! # Formatting
//!
//! | Event | Category | Text |
//! |-------|----------|------|
//! | `status(s)` | `status` | `s` verbatim |
//! | `message(p, tag)` | `message` | `tag: ` + JSON of `p` (tag optional) |
//! | `debug(s)` | `debug` | `s` verbatim |
//! | `error(p)` | `error` | JSON of `p` |
//! | `alert(p)` | - | not logged |

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::connection::NormalizedEvent;
use crate::error::Result;
use crate::identifiers::{SubscriptionId, ToggleId};
use crate::ui::{Toggle, ToggleBoard};

use super::entry::{CategoryVisibility, LogCategory, LogEntry};
use super::sink::LogSink;

// ============================================================================
// LogRouter
// ============================================================================

/// Shared handle to the session log.
///
/// Clones share the same history and visibility state.
#[derive(Clone)]
pub struct LogRouter {
    state: Arc<Mutex<RouterState>>,
    sink: Option<Arc<dyn LogSink>>,
}

struct RouterState {
    entries: Vec<LogEntry>,
    visibility: CategoryVisibility,
}

impl LogRouter {
    /// Creates a router with the given initial visibility.
    #[must_use]
    pub fn new(visibility: CategoryVisibility) -> Self {
        Self {
            state: Arc::new(Mutex::new(RouterState {
                entries: Vec::new(),
                visibility,
            })),
            sink: None,
        }
    }

    /// Forwards appends and visibility commands to `sink`.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        for category in LogCategory::ALL {
            sink.set_visibility(category, self.is_visible(category));
        }
        self.sink = Some(sink);
        self
    }

    // ========================================================================
    // Appending
    // ========================================================================

    /// Appends `payload` under a category given by name.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownCategory`](crate::Error::UnknownCategory) if
    /// `category` is not one of the four fixed names. Nothing is appended.
    pub fn log(&self, category: &str, payload: impl Into<String>) -> Result<()> {
        let category = category.parse::<LogCategory>()?;
        self.append(category, payload);
        Ok(())
    }

    /// Appends `payload` under `category`.
    pub fn append(&self, category: LogCategory, payload: impl Into<String>) {
        let entry = LogEntry::now(category, payload);
        trace!(%category, payload = %entry.payload, "Log entry appended");

        if let Some(sink) = &self.sink {
            sink.append(category, &entry.payload);
        }
        self.state.lock().entries.push(entry);
    }

    /// Formats and appends a normalized event.
    ///
    /// Returns `false` for alerts, which are not logged.
    pub fn record(&self, event: &NormalizedEvent) -> bool {
        let (category, text) = match event {
            NormalizedEvent::Status(status) => (LogCategory::Status, status.clone()),
            NormalizedEvent::Message { payload, tag } => {
                let text = match tag {
                    Some(tag) => format!("{tag}: {payload}"),
                    None => payload.to_string(),
                };
                (LogCategory::Message, text)
            }
            NormalizedEvent::Debug(text) => (LogCategory::Debug, text.clone()),
            NormalizedEvent::Error(payload) => (LogCategory::Error, payload.to_string()),
            NormalizedEvent::Alert(_) => return false,
        };

        self.append(category, text);
        true
    }

    // ========================================================================
    // Visibility
    // ========================================================================

    /// Shows or hides a category without touching history.
    pub fn set_visibility(&self, category: LogCategory, visible: bool) {
        self.state.lock().visibility.set(category, visible);
        debug!(%category, visible, "Log visibility changed");

        if let Some(sink) = &self.sink {
            sink.set_visibility(category, visible);
        }
    }

    /// Whether `category` is displayed.
    #[must_use]
    pub fn is_visible(&self, category: LogCategory) -> bool {
        self.state.lock().visibility.get(category)
    }

    /// Snapshot of all visibility flags.
    #[must_use]
    pub fn visibility(&self) -> CategoryVisibility {
        self.state.lock().visibility
    }

    /// Wires the `log_<category>` toggles to [`set_visibility`](Self::set_visibility).
    ///
    /// Each toggle is checked according to the current visibility. Missing
    /// toggles are skipped.
    pub fn bind_toggles(&self, board: &dyn ToggleBoard) -> Vec<(Arc<dyn Toggle>, SubscriptionId)> {
        let mut bindings = Vec::with_capacity(LogCategory::ALL.len());

        for category in LogCategory::ALL {
            let Some(toggle) = board.toggle(&ToggleId::log(category)) else {
                trace!(%category, "No log toggle on the surface");
                continue;
            };

            toggle.set_checked(self.is_visible(category));

            let router = self.clone();
            let subscription = toggle.on_change(Arc::new(move |checked: bool| {
                router.set_visibility(category, checked);
            }));
            bindings.push((toggle, subscription));
        }

        bindings
    }

    // ========================================================================
    // Reading
    // ========================================================================

    /// Full history in append order.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.state.lock().entries.clone()
    }

    /// History filtered by current visibility.
    #[must_use]
    pub fn visible_entries(&self) -> Vec<LogEntry> {
        let state = self.state.lock();
        state
            .entries
            .iter()
            .filter(|entry| state.visibility.get(entry.category))
            .cloned()
            .collect()
    }

    /// Entries of one category, in order.
    #[must_use]
    pub fn entries_in(&self, category: LogCategory) -> Vec<String> {
        self.state
            .lock()
            .entries
            .iter()
            .filter(|entry| entry.category == category)
            .map(|entry| entry.payload.clone())
            .collect()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Returns `true` if nothing was logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }
}

impl Default for LogRouter {
    fn default() -> Self {
        Self::new(CategoryVisibility::all_visible())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::error::Error;
    use crate::log::MemorySink;
    use crate::ui::MemoryBoard;

    #[test]
    fn test_log_by_name() {
        let router = LogRouter::default();
        router.log("status", "connected").expect("known category");

        assert_eq!(router.entries_in(LogCategory::Status), vec!["connected"]);
    }

    #[test]
    fn test_unknown_category_rejected() {
        let router = LogRouter::default();
        let err = router.log("trace", "nope").unwrap_err();

        assert!(matches!(err, Error::UnknownCategory { ref category } if category == "trace"));
        assert!(router.is_empty());
    }

    #[test]
    fn test_record_formats_events() {
        let router = LogRouter::default();
        router.record(&NormalizedEvent::status("connecting"));
        router.record(&NormalizedEvent::message(json!({"a": 1}), None));
        router.record(&NormalizedEvent::message(json!("hi"), Some("public-channel".into())));
        router.record(&NormalizedEvent::error(json!({"code": 4001})));
        router.record(&NormalizedEvent::debug("session id: 1.2"));

        let lines: Vec<_> = router.entries().into_iter().map(|e| e.payload).collect();
        assert_eq!(
            lines,
            vec![
                "connecting",
                "{\"a\":1}",
                "public-channel: \"hi\"",
                "{\"code\":4001}",
                "session id: 1.2",
            ]
        );
    }

    #[test]
    fn test_alerts_not_logged() {
        let router = LogRouter::default();
        assert!(!router.record(&NormalizedEvent::alert(json!("boom"))));
        assert!(router.is_empty());
    }

    #[test]
    fn test_hiding_messages_keeps_history_and_other_categories() {
        let router = LogRouter::default();
        router.append(LogCategory::Message, "before");
        router.append(LogCategory::Status, "connected");

        router.set_visibility(LogCategory::Message, false);
        router.append(LogCategory::Message, "after");

        assert_eq!(router.len(), 3);
        assert_eq!(router.entries_in(LogCategory::Message), vec!["before", "after"]);

        let visible: Vec<_> = router.visible_entries().into_iter().map(|e| e.payload).collect();
        assert_eq!(visible, vec!["connected"]);
        assert!(router.is_visible(LogCategory::Status));
        assert!(router.is_visible(LogCategory::Debug));
        assert!(router.is_visible(LogCategory::Error));

        router.set_visibility(LogCategory::Message, true);
        assert_eq!(router.visible_entries().len(), 3);
    }

    #[test]
    fn test_sink_receives_appends_and_visibility() {
        let sink = Arc::new(MemorySink::new());
        let router = LogRouter::default().with_sink(sink.clone());

        router.append(LogCategory::Debug, "hello");
        router.set_visibility(LogCategory::Debug, false);

        assert_eq!(sink.lines(), vec![(LogCategory::Debug, "hello".to_string())]);
        assert!(!sink.is_visible(LogCategory::Debug));
        assert!(sink.is_visible(LogCategory::Status));
    }

    #[test]
    fn test_bind_toggles() {
        let mut visibility = CategoryVisibility::all_visible();
        visibility.set(LogCategory::Debug, false);
        let router = LogRouter::new(visibility);
        let board = MemoryBoard::new().with_log_toggles();

        let bindings = router.bind_toggles(&board);
        assert_eq!(bindings.len(), 4);

        let debug_toggle = board.log(LogCategory::Debug).expect("toggle");
        let status_toggle = board.log(LogCategory::Status).expect("toggle");
        assert!(!debug_toggle.is_checked());
        assert!(status_toggle.is_checked());

        debug_toggle.click();
        assert!(router.is_visible(LogCategory::Debug));

        status_toggle.click();
        assert!(!router.is_visible(LogCategory::Status));
    }

    #[test]
    fn test_bind_toggles_skips_missing() {
        let router = LogRouter::default();
        let board = MemoryBoard::new();
        board.insert(ToggleId::log(LogCategory::Error));

        assert_eq!(router.bind_toggles(&board).len(), 1);
    }
}
