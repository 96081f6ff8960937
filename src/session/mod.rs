//! Session wiring and command loop.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Session`] | Composition root owning plan, registry, overrides, log, adapter |
//! | [`Surface`] | Toggles, status line, notifier and optional log sink |
//! | [`MemorySurface`] | In-memory surface |
//! | [`SessionCommand`] | Button presses processed by the loop |
//! | [`SessionHandle`] | Sender side of a spawned session |

// ============================================================================
// Submodules
// ============================================================================

/// Command loop and handle.
pub mod command;

/// Session startup and teardown.
pub mod core;

/// Host-side collaborators.
pub mod surface;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{SessionCommand, SessionHandle};
pub use core::Session;
pub use surface::{MemorySurface, Surface};
