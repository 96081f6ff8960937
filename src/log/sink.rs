//! Log sink interface.
//!
//! The sink is where a host renders the log panel. Rendering itself is
//! out of scope; the router only pushes appends and visibility commands.

// ============================================================================
// Imports
// ============================================================================

use parking_lot::Mutex;

use super::entry::{CategoryVisibility, LogCategory};

// ============================================================================
// LogSink
// ============================================================================

/// Receiver of formatted log lines and visibility commands.
pub trait LogSink: Send + Sync {
    /// Appends one formatted line.
    fn append(&self, category: LogCategory, text: &str);

    /// Shows or hides a category.
    fn set_visibility(&self, category: LogCategory, visible: bool);
}

// ============================================================================
// MemorySink
// ============================================================================

/// Sink that records everything it receives.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<(LogCategory, String)>>,
    visibility: Mutex<CategoryVisibility>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines received so far.
    #[must_use]
    pub fn lines(&self) -> Vec<(LogCategory, String)> {
        self.lines.lock().clone()
    }

    /// Last visibility command for `category`.
    #[must_use]
    pub fn is_visible(&self, category: LogCategory) -> bool {
        self.visibility.lock().get(category)
    }
}

impl LogSink for MemorySink {
    fn append(&self, category: LogCategory, text: &str) {
        self.lines.lock().push((category, text.to_string()));
    }

    fn set_visibility(&self, category: LogCategory, visible: bool) {
        self.visibility.lock().set(category, visible);
    }
}
