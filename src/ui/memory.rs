//! In-memory UI collaborators.
//!
//! Used by headless hosts, the demo and the tests. [`MemoryToggle::click`]
//! simulates user interaction: it is ignored on a disabled toggle and
//! fires every change handler otherwise.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::identifiers::{SubscriptionId, ToggleId};
use crate::log::LogCategory;
use crate::transport::LEGACY_TRANSPORTS;

use super::{ChangeHandler, Notifier, StatusDisplay, Toggle, ToggleBoard};

// ============================================================================
// MemoryToggle
// ============================================================================

/// Checkbox state held in memory.
pub struct MemoryToggle {
    state: Mutex<ToggleState>,
    handlers: Mutex<Vec<(SubscriptionId, ChangeHandler)>>,
}

#[derive(Debug, Clone, Copy)]
struct ToggleState {
    checked: bool,
    enabled: bool,
}

impl MemoryToggle {
    /// Creates an unchecked, enabled toggle.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ToggleState {
                checked: false,
                enabled: true,
            }),
            handlers: Mutex::new(Vec::new()),
        }
    }

    /// Returns `true` if the toggle is interactable.
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.state.lock().enabled
    }

    /// Number of registered change handlers.
    #[inline]
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.lock().len()
    }

    /// Simulates a user click.
    ///
    /// Returns `false` without any effect if the toggle is disabled.
    pub fn click(&self) -> bool {
        let checked = {
            let mut state = self.state.lock();
            if !state.enabled {
                return false;
            }
            state.checked = !state.checked;
            state.checked
        };

        let handlers: Vec<ChangeHandler> = self
            .handlers
            .lock()
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        for handler in handlers {
            handler(checked);
        }
        true
    }
}

impl Default for MemoryToggle {
    fn default() -> Self {
        Self::new()
    }
}

impl Toggle for MemoryToggle {
    fn is_checked(&self) -> bool {
        self.state.lock().checked
    }

    fn set_checked(&self, checked: bool) {
        self.state.lock().checked = checked;
    }

    fn set_enabled(&self, enabled: bool) {
        self.state.lock().enabled = enabled;
    }

    fn on_change(&self, handler: ChangeHandler) -> SubscriptionId {
        let id = SubscriptionId::generate();
        self.handlers.lock().push((id, handler));
        id
    }

    fn remove_handler(&self, subscription: SubscriptionId) -> bool {
        let mut handlers = self.handlers.lock();
        let before = handlers.len();
        handlers.retain(|(id, _)| *id != subscription);
        handlers.len() != before
    }
}

// ============================================================================
// MemoryBoard
// ============================================================================

/// A set of [`MemoryToggle`]s indexed by [`ToggleId`].
#[derive(Default)]
pub struct MemoryBoard {
    toggles: RwLock<FxHashMap<ToggleId, Arc<MemoryToggle>>>,
}

impl MemoryBoard {
    /// Creates an empty board.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Board with a toggle for every legacy transport and log category.
    #[must_use]
    pub fn standard() -> Self {
        Self::new()
            .with_transports(LEGACY_TRANSPORTS)
            .with_log_toggles()
    }

    /// Adds one toggle per transport name.
    #[must_use]
    pub fn with_transports<'a>(self, names: impl IntoIterator<Item = &'a str>) -> Self {
        for name in names {
            self.insert(ToggleId::transport(name));
        }
        self
    }

    /// Adds one toggle per log category.
    #[must_use]
    pub fn with_log_toggles(self) -> Self {
        for category in LogCategory::ALL {
            self.insert(ToggleId::log(category));
        }
        self
    }

    /// Adds (or replaces) a toggle and returns it.
    pub fn insert(&self, id: ToggleId) -> Arc<MemoryToggle> {
        let toggle = Arc::new(MemoryToggle::new());
        self.toggles.write().insert(id, Arc::clone(&toggle));
        toggle
    }

    /// Concrete toggle lookup.
    #[must_use]
    pub fn get(&self, id: &ToggleId) -> Option<Arc<MemoryToggle>> {
        self.toggles.read().get(id).cloned()
    }

    /// Concrete transport toggle lookup.
    #[must_use]
    pub fn transport(&self, name: &str) -> Option<Arc<MemoryToggle>> {
        self.get(&ToggleId::transport(name))
    }

    /// Concrete log toggle lookup.
    #[must_use]
    pub fn log(&self, category: LogCategory) -> Option<Arc<MemoryToggle>> {
        self.get(&ToggleId::log(category))
    }
}

impl ToggleBoard for MemoryBoard {
    fn toggle(&self, id: &ToggleId) -> Option<Arc<dyn Toggle>> {
        self.get(id).map(|toggle| toggle as Arc<dyn Toggle>)
    }
}

// ============================================================================
// MemoryStatus
// ============================================================================

/// Status line that remembers every text it displayed.
#[derive(Debug, Default)]
pub struct MemoryStatus {
    history: Mutex<Vec<String>>,
}

impl MemoryStatus {
    /// Creates an empty status line.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently displayed text.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        self.history.lock().last().cloned()
    }

    /// Every text displayed so far.
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.history.lock().clone()
    }
}

impl StatusDisplay for MemoryStatus {
    fn set_text(&self, text: &str) {
        self.history.lock().push(text.to_string());
    }
}

// ============================================================================
// MemoryNotifier
// ============================================================================

/// Notifier that collects alerts instead of blocking.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    alerts: Mutex<Vec<Value>>,
}

impl MemoryNotifier {
    /// Creates an empty notifier.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Alerts shown so far.
    #[must_use]
    pub fn alerts(&self) -> Vec<Value> {
        self.alerts.lock().clone()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, payload: &Value) {
        self.alerts.lock().push(payload.clone());
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    #[test]
    fn test_click_flips_and_notifies() {
        let toggle = MemoryToggle::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        toggle.on_change(Arc::new(move |checked: bool| sink.lock().push(checked)));

        assert!(toggle.click());
        assert!(toggle.click());
        assert_eq!(*seen.lock(), vec![true, false]);
    }

    #[test]
    fn test_set_checked_is_silent() {
        let toggle = MemoryToggle::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        toggle.on_change(Arc::new(move |_: bool| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        toggle.set_checked(true);
        assert!(toggle.is_checked());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_disabled_toggle_ignores_clicks() {
        let toggle = MemoryToggle::new();
        toggle.set_enabled(false);

        assert!(!toggle.click());
        assert!(!toggle.is_checked());
    }

    #[test]
    fn test_remove_handler() {
        let toggle = MemoryToggle::new();
        let id = toggle.on_change(Arc::new(|_: bool| {}));

        assert_eq!(toggle.handler_count(), 1);
        assert!(toggle.remove_handler(id));
        assert!(!toggle.remove_handler(id));
        assert_eq!(toggle.handler_count(), 0);
    }

    #[test]
    fn test_standard_board() {
        let board = MemoryBoard::standard();

        assert!(board.transport("xdr_polling").is_some());
        assert!(board.log(LogCategory::Error).is_some());
        assert!(board.toggle(&ToggleId::from("transport_carrier_pigeon")).is_none());
    }

    #[test]
    fn test_status_and_notifier() {
        let status = MemoryStatus::new();
        status.set_text("connecting");
        status.set_text("connected");
        assert_eq!(status.text().as_deref(), Some("connected"));
        assert_eq!(status.history().len(), 2);

        let notifier = MemoryNotifier::new();
        notifier.notify(&json!("fire drill"));
        assert_eq!(notifier.alerts(), vec![json!("fire drill")]);
    }
}
