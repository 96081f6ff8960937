//! Type-safe identifiers.
//!
//! Newtype wrappers prevent mixing a toggle identifier with an arbitrary
//! string, or a subscription handle with any other UUID.
//!
//! | Type | Format | Example |
//! |------|--------|---------|
//! | [`ToggleId`] | `transport_<name>` / `log_<category>` | `transport_ws` |
//! | [`SubscriptionId`] | UUID v4 | `550e8400-...` |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::log::LogCategory;

// ============================================================================
// SubscriptionId
// ============================================================================

/// Handle returned by every subscription; pass it back to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Generates a fresh random identifier.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[inline]
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ToggleId
// ============================================================================

/// Stable identifier of a UI toggle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToggleId(String);

impl ToggleId {
    /// Prefix shared by all transport toggles.
    pub const TRANSPORT_PREFIX: &'static str = "transport_";

    /// Prefix shared by all log category toggles.
    pub const LOG_PREFIX: &'static str = "log_";

    /// Identifier of the toggle controlling transport `name`.
    #[inline]
    #[must_use]
    pub fn transport(name: &str) -> Self {
        Self(format!("{}{name}", Self::TRANSPORT_PREFIX))
    }

    /// Identifier of the toggle controlling log `category`.
    #[inline]
    #[must_use]
    pub fn log(category: LogCategory) -> Self {
        Self(format!("{}{}", Self::LOG_PREFIX, category.as_str()))
    }

    /// Returns the identifier as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the transport name if this is a transport toggle.
    #[must_use]
    pub fn transport_name(&self) -> Option<&str> {
        self.0.strip_prefix(Self::TRANSPORT_PREFIX)
    }
}

impl fmt::Display for ToggleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ToggleId {
    #[inline]
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
