//! Client library binding interface.
//!
//! The realtime client library is a black box. This module fixes the
//! shape this crate expects from a binding to it; which parts are present
//! depends on the library version:
//!
//! | Capability | Present in |
//! |------------|------------|
//! | [`RealtimeLibrary::runtime_transports`] | `>= 3.1.0` |
//! | [`RealtimeLibrary::transport_class`] | `< 3.1.0` |
//! | [`ClientHandle::subscribe`] | `>= 1.4.0` |
//! | [`ClientHandle::connection`] | `>= 1.9.0` |
//! | [`ClientHandle::session_id`] | `>= 2.0.0` |
//! | [`RealtimeLibrary::socket_shim`] | flash builds (`< 1.5.0`) |
//!
//! Bindings must route every transport support check through the
//! [`SupportSlot`] they hand out, and must not fire client events
//! synchronously from within [`RealtimeLibrary::open`].
//!
//! [`simulated`] provides a scripted implementation of any version.

// ============================================================================
// Submodules
// ============================================================================

/// Scripted in-process client library.
pub mod simulated;

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::connection::ConnectOptions;
use crate::identifiers::SubscriptionId;
use crate::transport::SupportSlot;

// ============================================================================
// Re-exports
// ============================================================================

pub use simulated::{SimulatedChannel, SimulatedClient, SimulatedEvents, SimulatedLibrary, SimulatedShim};

// ============================================================================
// Types
// ============================================================================

/// Logger injected into the library and the socket shim.
pub type DebugLogger = Arc<dyn Fn(&str) + Send + Sync>;

/// Callback bound to a library event.
pub type EventCallback = Arc<dyn Fn(&Value) + Send + Sync>;

// ============================================================================
// Traits
// ============================================================================

/// Anything events can be bound on: root client, channel, connection.
pub trait EventSource: Send + Sync {
    /// Binds `callback` to `event`.
    fn bind(&self, event: &str, callback: EventCallback) -> SubscriptionId;

    /// Removes a binding. Returns `false` if it was not bound.
    fn unbind(&self, event: &str, binding: SubscriptionId) -> bool;
}

/// A subscribed channel.
pub trait ChannelHandle: EventSource {
    /// Channel name.
    fn name(&self) -> &str;

    /// Sends a client event on the channel. Returns `false` if refused.
    fn trigger(&self, event: &str, data: &Value) -> bool;
}

/// The root client object returned by [`RealtimeLibrary::open`].
pub trait ClientHandle: EventSource {
    /// Subscribes to a channel; `None` on clients without channel handles.
    fn subscribe(&self, channel: &str) -> Option<Arc<dyn ChannelHandle>>;

    /// Nested connection handle; `None` before `1.9.0`.
    fn connection(&self) -> Option<Arc<dyn EventSource>>;

    /// Session identifier; `None` before `2.0.0`.
    fn session_id(&self) -> Option<String>;

    /// Starts (or restarts) connecting. Results arrive as events.
    fn connect(&self);

    /// Closes the connection.
    fn disconnect(&self);
}

/// Flash socket emulation layer of old builds.
pub trait SocketShim: Send + Sync {
    /// Applies shim settings; called before the client is opened.
    fn configure(&self, settings: ShimSettings);
}

/// The client library itself.
pub trait RealtimeLibrary: Send + Sync {
    /// Self-reported version string.
    fn version(&self) -> String;

    /// Unified runtime transport table (`>= 3.1.0`).
    fn runtime_transports(&self) -> Vec<(String, Option<SupportSlot>)>;

    /// Top-level transport class by identifier (`< 3.1.0`).
    fn transport_class(&self, name: &str) -> Option<SupportSlot>;

    /// Flash socket shim, when the build ships one.
    fn socket_shim(&self) -> Option<Arc<dyn SocketShim>>;

    /// Creates a client.
    fn open(&self, key: &str, options: ConnectOptions, logger: DebugLogger) -> Arc<dyn ClientHandle>;
}

// ============================================================================
// ShimSettings
// ============================================================================

/// Settings pushed to the [`SocketShim`].
#[derive(Clone)]
pub struct ShimSettings {
    /// Fallback location of the flash bridge resource.
    pub swf_location: Option<String>,
    /// Enables shim debug output.
    pub debug: bool,
    /// Destination of shim debug output.
    pub logger: DebugLogger,
}

impl fmt::Debug for ShimSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShimSettings")
            .field("swf_location", &self.swf_location)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}
