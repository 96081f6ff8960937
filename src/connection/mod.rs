//! Connection setup and event normalization.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ConnectionProfile`] | Legacy, mid or modern subscription protocol |
//! | [`StatusBinding`] | Legacy events or nested `state_change` |
//! | [`ConnectOptions`] | Client constructor arguments |
//! | [`ConnectionAdapter`] | Opens the client and binds its events |
//! | [`NormalizedEvent`] | Version-independent event |
//! | [`EventBus`] | Typed fan-out of normalized events |

// ============================================================================
// Submodules
// ============================================================================

/// Client opening, bindings and button operations.
pub mod adapter;

/// Normalized events and the event bus.
pub mod events;

/// Client constructor arguments.
pub mod options;

/// Subscription profiles and protocol event names.
pub mod profile;

// ============================================================================
// Re-exports
// ============================================================================

pub use adapter::{CLIENT_EVENT, ConnectionAdapter, SWF_LOCATION};
pub use events::{EventBus, EventHandler, EventKind, NormalizedEvent};
pub use options::{AuthOptions, ClientOptions, ConnectOptions};
pub use profile::{ConnectionProfile, StatusBinding};
