//! UI collaborator interfaces.
//!
//! The control surface is external to this crate. It is reached through
//! four small traits:
//!
//! | Trait | Role |
//! |-------|------|
//! | [`Toggle`] | A checkbox: checked state, enabled state, change events |
//! | [`ToggleBoard`] | Lookup of toggles by [`ToggleId`] |
//! | [`StatusDisplay`] | Single-line connection status text |
//! | [`Notifier`] | Blocking user-facing alert |
//!
//! [`memory`] provides in-memory implementations for headless hosts.

// ============================================================================
// Submodules
// ============================================================================

/// In-memory implementations of the UI traits.
pub mod memory;

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use serde_json::Value;

use crate::identifiers::{SubscriptionId, ToggleId};

// ============================================================================
// Re-exports
// ============================================================================

pub use memory::{MemoryBoard, MemoryNotifier, MemoryStatus, MemoryToggle};

// ============================================================================
// Types
// ============================================================================

/// Toggle change callback, called with the new checked state.
pub type ChangeHandler = Arc<dyn Fn(bool) + Send + Sync>;

// ============================================================================
// Traits
// ============================================================================

/// A boolean UI toggle.
///
/// Programmatic [`set_checked`](Toggle::set_checked) does not fire change
/// handlers; only user interaction does.
pub trait Toggle: Send + Sync {
    /// Current checked state.
    fn is_checked(&self) -> bool;

    /// Sets the checked state without notifying handlers.
    fn set_checked(&self, checked: bool);

    /// Makes the toggle interactable or not.
    fn set_enabled(&self, enabled: bool);

    /// Registers a change handler.
    fn on_change(&self, handler: ChangeHandler) -> SubscriptionId;

    /// Removes a change handler. Returns `false` if it was not registered.
    fn remove_handler(&self, subscription: SubscriptionId) -> bool;
}

/// Toggles indexed by stable identifier.
pub trait ToggleBoard: Send + Sync {
    /// Looks up a toggle; `None` if the surface has no such element.
    fn toggle(&self, id: &ToggleId) -> Option<Arc<dyn Toggle>>;
}

/// Connection status line.
pub trait StatusDisplay: Send + Sync {
    /// Replaces the displayed status.
    fn set_text(&self, text: &str);
}

/// Blocking user notification.
pub trait Notifier: Send + Sync {
    /// Shows `payload` to the operator.
    fn notify(&self, payload: &Value);
}
