//! Normalized connection events and their bus.
//!
//! Whatever the library version, the adapter emits only these five event
//! kinds:
//!
//! | Kind | Payload | Source |
//! |------|---------|--------|
//! | `status` | status string | legacy connection events or `state_change` |
//! | `message` | JSON + optional channel tag | channel/root `event` |
//! | `alert` | JSON | channel/root `alert` |
//! | `error` | JSON | connection `error` |
//! | `debug` | text | library logger, session id |

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::trace;

use crate::identifiers::SubscriptionId;
use crate::log::LogCategory;

// ============================================================================
// NormalizedEvent
// ============================================================================

/// A version-independent connection event.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedEvent {
    /// Connection status changed.
    Status(String),
    /// Channel message.
    Message {
        /// Event data.
        payload: Value,
        /// Originating channel, when the profile tags messages.
        tag: Option<String>,
    },
    /// Operator-visible interrupt.
    Alert(Value),
    /// Library-reported connection error.
    Error(Value),
    /// Diagnostic text.
    Debug(String),
}

impl NormalizedEvent {
    /// Creates a status event.
    #[inline]
    #[must_use]
    pub fn status(status: impl Into<String>) -> Self {
        Self::Status(status.into())
    }

    /// Creates a message event.
    #[inline]
    #[must_use]
    pub fn message(payload: Value, tag: Option<String>) -> Self {
        Self::Message { payload, tag }
    }

    /// Creates an alert event.
    #[inline]
    #[must_use]
    pub fn alert(payload: Value) -> Self {
        Self::Alert(payload)
    }

    /// Creates an error event.
    #[inline]
    #[must_use]
    pub fn error(payload: Value) -> Self {
        Self::Error(payload)
    }

    /// Creates a debug event.
    #[inline]
    #[must_use]
    pub fn debug(text: impl Into<String>) -> Self {
        Self::Debug(text.into())
    }

    /// Kind of this event.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Status(_) => EventKind::Status,
            Self::Message { .. } => EventKind::Message,
            Self::Alert(_) => EventKind::Alert,
            Self::Error(_) => EventKind::Error,
            Self::Debug(_) => EventKind::Debug,
        }
    }
}

// ============================================================================
// EventKind
// ============================================================================

/// Discriminant of [`NormalizedEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// [`NormalizedEvent::Status`].
    Status,
    /// [`NormalizedEvent::Message`].
    Message,
    /// [`NormalizedEvent::Alert`].
    Alert,
    /// [`NormalizedEvent::Error`].
    Error,
    /// [`NormalizedEvent::Debug`].
    Debug,
}

impl EventKind {
    /// Log category the kind is recorded under; alerts are not logged.
    #[must_use]
    pub const fn log_category(self) -> Option<LogCategory> {
        match self {
            Self::Status => Some(LogCategory::Status),
            Self::Message => Some(LogCategory::Message),
            Self::Error => Some(LogCategory::Error),
            Self::Debug => Some(LogCategory::Debug),
            Self::Alert => None,
        }
    }
}

// ============================================================================
// EventBus
// ============================================================================

/// Callback receiving normalized events.
pub type EventHandler = Arc<dyn Fn(&NormalizedEvent) + Send + Sync>;

/// Ordered fan-out of normalized events to typed subscribers.
///
/// Clones share the same subscriber list. Handlers run in subscription
/// order, outside the internal lock, so a handler may subscribe or
/// unsubscribe.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
}

struct Subscriber {
    id: SubscriptionId,
    kind: Option<EventKind>,
    handler: EventHandler,
}

impl EventBus {
    /// Creates a bus without subscribers.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to one event kind.
    pub fn subscribe(&self, kind: EventKind, handler: EventHandler) -> SubscriptionId {
        self.push(Some(kind), handler)
    }

    /// Subscribes to every event.
    pub fn subscribe_all(&self, handler: EventHandler) -> SubscriptionId {
        self.push(None, handler)
    }

    /// Subscribes to status strings.
    pub fn on_status(&self, f: impl Fn(&str) + Send + Sync + 'static) -> SubscriptionId {
        self.subscribe(
            EventKind::Status,
            Arc::new(move |event: &NormalizedEvent| {
                if let NormalizedEvent::Status(status) = event {
                    f(status);
                }
            }),
        )
    }

    /// Subscribes to messages and their optional channel tag.
    pub fn on_message(
        &self,
        f: impl Fn(&Value, Option<&str>) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.subscribe(
            EventKind::Message,
            Arc::new(move |event: &NormalizedEvent| {
                if let NormalizedEvent::Message { payload, tag } = event {
                    f(payload, tag.as_deref());
                }
            }),
        )
    }

    /// Subscribes to alerts.
    pub fn on_alert(&self, f: impl Fn(&Value) + Send + Sync + 'static) -> SubscriptionId {
        self.subscribe(
            EventKind::Alert,
            Arc::new(move |event: &NormalizedEvent| {
                if let NormalizedEvent::Alert(payload) = event {
                    f(payload);
                }
            }),
        )
    }

    /// Subscribes to connection errors.
    pub fn on_error(&self, f: impl Fn(&Value) + Send + Sync + 'static) -> SubscriptionId {
        self.subscribe(
            EventKind::Error,
            Arc::new(move |event: &NormalizedEvent| {
                if let NormalizedEvent::Error(payload) = event {
                    f(payload);
                }
            }),
        )
    }

    /// Subscribes to debug text.
    pub fn on_debug(&self, f: impl Fn(&str) + Send + Sync + 'static) -> SubscriptionId {
        self.subscribe(
            EventKind::Debug,
            Arc::new(move |event: &NormalizedEvent| {
                if let NormalizedEvent::Debug(text) = event {
                    f(text);
                }
            }),
        )
    }

    /// Removes a subscription. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        subscribers.len() != before
    }

    /// Delivers `event`; returns how many handlers received it.
    pub fn emit(&self, event: NormalizedEvent) -> usize {
        let kind = event.kind();
        let handlers: Vec<EventHandler> = self
            .subscribers
            .lock()
            .iter()
            .filter(|s| s.kind.is_none_or(|k| k == kind))
            .map(|s| Arc::clone(&s.handler))
            .collect();

        trace!(?kind, receivers = handlers.len(), "Event emitted");
        for handler in &handlers {
            handler(&event);
        }
        handlers.len()
    }

    /// Number of active subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    fn push(&self, kind: Option<EventKind>, handler: EventHandler) -> SubscriptionId {
        let id = SubscriptionId::generate();
        self.subscribers.lock().push(Subscriber { id, kind, handler });
        id
    }
}

// ============================================================================
// Tests
// ============================================================================
