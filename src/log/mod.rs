//! Session log.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`LogCategory`] | `status`, `message`, `debug`, `error` |
//! | [`LogEntry`] | One appended line |
//! | [`CategoryVisibility`] | Display flag per category |
//! | [`LogRouter`] | Append-only history with visibility filtering |
//! | [`LogSink`] | Host-side renderer |

// ============================================================================
// Submodules
// ============================================================================

/// Categories, entries and visibility.
pub mod entry;

/// The log router.
pub mod router;

/// Sink interface and in-memory sink.
pub mod sink;

// ============================================================================
// Re-exports
// ============================================================================

pub use entry::{CategoryVisibility, LogCategory, LogEntry};
pub use router::LogRouter;
pub use sink::{LogSink, MemorySink};
