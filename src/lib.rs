//! Pusher Compat - Version-dispatch layer for realtime pub/sub clients.
//!
//! This library drives a single control surface (transport toggles, a log
//! panel, a status line, connect/disconnect/trigger buttons) against many
//! mutually incompatible releases of a realtime client library.
//!
//! # Architecture
//!
//! Every version-dependent decision is made once, at session start:
//!
//! - **[`CompatibilityPlan`]**: registry shape, connection profile, status
//!   binding, session-id logging and flash fallback for the detected version
//! - **[`TransportRegistry`]**: transport descriptors wrapping the library's
//!   own support checks in swappable [`SupportSlot`]s
//! - **[`TransportOverrideController`]**: one toggle per transport, forcing
//!   support off without losing native detection
//! - **[`ConnectionAdapter`]**: opens the client the way its version
//!   expects and normalizes its events onto an [`EventBus`]
//! - **[`LogRouter`]**: category-tagged history with visibility toggles
//!
//! [`Session`] wires them together and runs the button command loop.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use pusher_compat::library::SimulatedLibrary;
//! use pusher_compat::session::{MemorySurface, Session};
//! use pusher_compat::version::Version;
//! use pusher_compat::{Result, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let library = Arc::new(SimulatedLibrary::new(Version::new(2, 1, 0)).with_default_transports());
//!     let surface = MemorySurface::standard();
//!
//!     let config = SessionConfig::from_json(r#"{"key":"app-key","name":"dev","enabledTransports":["ws"]}"#)?;
//!     let session = Session::start(config, library, surface.surface())?;
//!
//!     let (handle, task) = session.spawn();
//!     handle.connect()?;
//!     handle.shutdown()?;
//!
//!     let session = task.await.expect("session loop");
//!     for entry in session.log().visible_entries() {
//!         println!("[{}] {}", entry.category, entry.payload);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | [`SessionConfig`] |
//! | [`connection`] | Profiles, [`ConnectionAdapter`], [`EventBus`] |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | [`SubscriptionId`], [`ToggleId`] |
//! | [`library`] | Client library interface and simulated library |
//! | [`log`] | [`LogRouter`] and sinks |
//! | [`session`] | [`Session`] and its command loop |
//! | [`transport`] | Registry, support slots, overrides |
//! | [`ui`] | Toggle, status and notifier interfaces |
//! | [`version`] | [`Version`], comparator, [`CompatibilityPlan`] |

// ============================================================================
// Modules
// ============================================================================

/// Session configuration.
pub mod config;

/// Connection profiles, adapter and normalized events.
///
/// - [`ConnectionAdapter`] - Opens the client and binds its events
/// - [`EventBus`] - Typed fan-out of [`NormalizedEvent`]s
pub mod connection;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// Client library interface.
///
/// [`library::SimulatedLibrary`] scripts any library version in-process.
pub mod library;

/// Category-tagged session log.
pub mod log;

/// Session composition root and command loop.
pub mod session;

/// Transport registry and overrides.
pub mod transport;

/// Control surface interfaces and in-memory implementations.
pub mod ui;

/// Version comparison and compatibility plan.
pub mod version;

// ============================================================================
// Re-exports
// ============================================================================

// Configuration
pub use config::SessionConfig;

// Connection types
pub use connection::{
    ConnectOptions, ConnectionAdapter, ConnectionProfile, EventBus, EventKind, NormalizedEvent,
    StatusBinding,
};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{SubscriptionId, ToggleId};

// Log types
pub use log::{CategoryVisibility, LogCategory, LogEntry, LogRouter, LogSink};

// Session types
pub use session::{Session, SessionCommand, SessionHandle, Surface};

// Transport types
pub use transport::{
    Environment, RegistryShape, SupportPredicate, SupportSlot, TransportDescriptor,
    TransportOverrideController, TransportOverrides, TransportRegistry,
};

// Version types
pub use version::{CompatibilityPlan, Version, VersionTable};
