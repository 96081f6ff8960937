//! Support predicates and swappable predicate slots.
//!
//! A [`SupportSlot`] is the shared cell through which both the client
//! library and this crate look at a transport's *active* support
//! predicate. Swapping the slot's content affects the very next support
//! check the library performs.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

// ============================================================================
// Environment
// ============================================================================

/// Minimal context a support predicate may consult.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Environment {
    /// Whether the session runs over an encrypted connection.
    pub encrypted: bool,
}

impl Environment {
    /// Creates an environment.
    #[inline]
    #[must_use]
    pub const fn new(encrypted: bool) -> Self {
        Self { encrypted }
    }
}

// ============================================================================
// SupportPredicate
// ============================================================================

/// Answers whether a transport is usable in an environment.
pub type SupportPredicate = Arc<dyn Fn(&Environment) -> bool + Send + Sync>;

/// Wraps a closure as a [`SupportPredicate`].
#[inline]
#[must_use]
pub fn predicate(f: impl Fn(&Environment) -> bool + Send + Sync + 'static) -> SupportPredicate {
    Arc::new(f)
}

/// Predicate that rejects every environment.
#[must_use]
pub fn never_supported() -> SupportPredicate {
    predicate(|_| false)
}

// ============================================================================
// SupportSlot
// ============================================================================

/// Shared, swappable holder of a transport's active support predicate.
///
/// Clones share the same cell.
#[derive(Clone)]
pub struct SupportSlot {
    inner: Arc<RwLock<SupportPredicate>>,
}

impl SupportSlot {
    /// Creates a slot holding `predicate`.
    #[inline]
    #[must_use]
    pub fn new(predicate: SupportPredicate) -> Self {
        Self {
            inner: Arc::new(RwLock::new(predicate)),
        }
    }

    /// Creates a slot from a closure.
    #[inline]
    #[must_use]
    pub fn from_fn(f: impl Fn(&Environment) -> bool + Send + Sync + 'static) -> Self {
        Self::new(predicate(f))
    }

    /// Returns the active predicate.
    #[inline]
    #[must_use]
    pub fn get(&self) -> SupportPredicate {
        Arc::clone(&self.inner.read())
    }

    /// Replaces the active predicate.
    #[inline]
    pub fn set(&self, predicate: SupportPredicate) {
        *self.inner.write() = predicate;
    }

    /// Evaluates the active predicate.
    ///
    /// The lock is released before the predicate runs.
    #[must_use]
    pub fn check(&self, environment: &Environment) -> bool {
        let active = self.get();
        active(environment)
    }

    /// Returns `true` if both handles share the same cell.
    #[inline]
    #[must_use]
    pub fn same_slot(&self, other: &SupportSlot) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns `true` if the slot currently holds exactly `predicate`.
    #[inline]
    #[must_use]
    pub fn holds(&self, predicate: &SupportPredicate) -> bool {
        Arc::ptr_eq(&self.inner.read(), predicate)
    }
}

impl fmt::Debug for SupportSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupportSlot")
            .field("cell", &Arc::as_ptr(&self.inner))
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_uses_environment() {
        let slot = SupportSlot::from_fn(|env| env.encrypted);
        assert!(slot.check(&Environment::new(true)));
        assert!(!slot.check(&Environment::new(false)));
    }

    #[test]
    fn test_set_is_visible_through_clones() {
        let slot = SupportSlot::from_fn(|_| true);
        let library_view = slot.clone();

        slot.set(never_supported());
        assert!(!library_view.check(&Environment::default()));
        assert!(slot.same_slot(&library_view));
    }

    #[test]
    fn test_holds_tracks_identity() {
        let original = predicate(|_| true);
        let slot = SupportSlot::new(Arc::clone(&original));
        assert!(slot.holds(&original));

        slot.set(never_supported());
        assert!(!slot.holds(&original));

        slot.set(Arc::clone(&original));
        assert!(slot.holds(&original));
    }

    #[test]
    fn test_distinct_slots() {
        let a = SupportSlot::from_fn(|_| true);
        let b = SupportSlot::from_fn(|_| true);
        assert!(!a.same_slot(&b));
    }
}
