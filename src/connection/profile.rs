//! Connection protocol profiles and status binding styles.
//!
//! A profile fixes how the client is opened, which channels are
//! subscribed and where `event`/`alert` are bound:
//!
//! | Profile | Open | Channels | Bound on | Message tag |
//! |---------|------|----------|----------|-------------|
//! | `Legacy` | positional channel | - | root handle | none |
//! | `Mid` | options (auth, cluster) | presence | channel handle | none |
//! | `Modern` | options (forced encrypted ws) | four | channel handles | channel name |

// ============================================================================
// Constants
// ============================================================================

/// Channel subscribed by the legacy and mid profiles.
pub const PRESENCE_CHANNEL: &str = "presence-channel";

/// Channels subscribed by the modern profile, in subscription order.
pub const MODERN_CHANNELS: [&str; 4] = [
    "presence-channel",
    "public-channel",
    "private-channel",
    "private-encrypted-channel",
];

/// Channel-level event carrying messages.
pub const MESSAGE_EVENT: &str = "event";

/// Channel-level event carrying operator alerts.
pub const ALERT_EVENT: &str = "alert";

/// Legacy spellings of "connection established". Both are bound.
pub const LEGACY_ESTABLISHED_EVENTS: [&str; 2] =
    ["pusher:connection_established", "connection_established"];

/// Legacy spellings of "connection failed". Both are bound.
pub const LEGACY_FAILED_EVENTS: [&str; 2] = ["pusher:connection_failed", "connection_failed"];

/// Nested connection handle state-change event.
pub const STATE_CHANGE_EVENT: &str = "state_change";

/// Nested connection handle error event.
pub const CONNECTION_ERROR_EVENT: &str = "error";

/// Status logged before the legacy status events are bound.
pub const STATUS_CONNECTING: &str = "connecting";

/// Status logged on a legacy "connection established" event.
pub const STATUS_CONNECTED: &str = "connected";

/// Status logged on a legacy "connection failed" event.
pub const STATUS_DISCONNECTED: &str = "disconnected";

// ============================================================================
// ConnectionProfile
// ============================================================================

/// Subscription protocol selected once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionProfile {
    /// Positional channel argument, events bound on the root handle.
    Legacy,
    /// Options object, single presence channel.
    Mid,
    /// Forced encrypted transport, four tagged channels.
    Modern,
}

impl ConnectionProfile {
    /// Channels to auto-subscribe; empty for [`Legacy`](Self::Legacy).
    #[must_use]
    pub fn channels(self) -> &'static [&'static str] {
        match self {
            Self::Legacy => &[],
            Self::Mid => &[PRESENCE_CHANNEL],
            Self::Modern => &MODERN_CHANNELS,
        }
    }

    /// Whether messages are tagged with their channel name.
    #[inline]
    #[must_use]
    pub const fn tags_messages(self) -> bool {
        matches!(self, Self::Modern)
    }

    /// Whether `event`/`alert` are bound on the root handle.
    #[inline]
    #[must_use]
    pub const fn binds_on_root(self) -> bool {
        matches!(self, Self::Legacy)
    }
}

// ============================================================================
// StatusBinding
// ============================================================================

/// How connection status is observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusBinding {
    /// Four discrete legacy events on the root handle (`< 1.9.0`).
    LegacyEvents,
    /// `state_change` and `error` on the nested connection handle.
    StateChange,
}

// ============================================================================
// Tests
// ============================================================================
