//! Host-side collaborators of a session.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use crate::log::LogSink;
use crate::ui::{MemoryBoard, MemoryNotifier, MemoryStatus, Notifier, StatusDisplay, ToggleBoard};

// ============================================================================
// Surface
// ============================================================================

/// The control surface a session drives.
#[derive(Clone)]
pub struct Surface {
    /// Transport and log toggles.
    pub toggles: Arc<dyn ToggleBoard>,
    /// Connection status line.
    pub status: Arc<dyn StatusDisplay>,
    /// Alert notifier.
    pub notifier: Arc<dyn Notifier>,
    /// Optional log renderer.
    pub sink: Option<Arc<dyn LogSink>>,
}

impl Surface {
    /// Creates a surface without a log sink.
    #[must_use]
    pub fn new(
        toggles: Arc<dyn ToggleBoard>,
        status: Arc<dyn StatusDisplay>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            toggles,
            status,
            notifier,
            sink: None,
        }
    }

    /// Attaches a log sink.
    #[inline]
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = Some(sink);
        self
    }
}

// ============================================================================
// MemorySurface
// ============================================================================

/// In-memory surface with typed access to each part.
#[derive(Clone, Default)]
pub struct MemorySurface {
    /// Standard toggle board.
    pub board: Arc<MemoryBoard>,
    /// Status line.
    pub status: Arc<MemoryStatus>,
    /// Alert recorder.
    pub notifier: Arc<MemoryNotifier>,
}

impl MemorySurface {
    /// Surface with every legacy transport toggle and the four log toggles.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            board: Arc::new(MemoryBoard::standard()),
            ..Default::default()
        }
    }

    /// Type-erased view for [`Session::start`](super::Session::start).
    #[must_use]
    pub fn surface(&self) -> Surface {
        Surface::new(
            Arc::clone(&self.board) as Arc<dyn ToggleBoard>,
            Arc::clone(&self.status) as Arc<dyn StatusDisplay>,
            Arc::clone(&self.notifier) as Arc<dyn Notifier>,
        )
    }
}
