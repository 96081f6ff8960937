//! Version-specific connection setup, normalized onto the [`EventBus`].
//!
//! The adapter is the only component that talks to the client library
//! after the registry is built. It is opened once per session from the
//! [`CompatibilityPlan`] and never re-classifies.
//!
//! Setup order:
//!
//! 1. Configure the socket shim (flash builds; required below `1.5.0`)
//! 2. Open the client with the profile's constructor arguments
//! 3. Subscribe channels and bind `event` / `alert`
//! 4. Emit the `session id` debug entry (`>= 2.0.0`)
//! 5. Bind connection status events
//!
//! # Example
//!
//! ```
//! use pusher_compat::connection::{ConnectionAdapter, EventBus};
//! use pusher_compat::library::SimulatedLibrary;
//! use pusher_compat::transport::Environment;
//! use pusher_compat::version::{CompatibilityPlan, Version};
//!
//! let version = Version::new(2, 1, 0);
//! let library = SimulatedLibrary::new(version).with_default_transports();
//! let plan = CompatibilityPlan::resolve(version, Environment::new(false));
//!
//! let bus = EventBus::new();
//! let adapter = ConnectionAdapter::open(&plan, &library, "app-key", "staging", &bus)?;
//! assert_eq!(adapter.channels(), vec!["presence-channel"]);
//! # Ok::<(), pusher_compat::Error>(())
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::SubscriptionId;
use crate::library::{
    ChannelHandle, ClientHandle, DebugLogger, EventCallback, EventSource, RealtimeLibrary,
    ShimSettings,
};
use crate::version::CompatibilityPlan;

use super::events::{EventBus, NormalizedEvent};
use super::options::{ClientOptions, ConnectOptions};
use super::profile::{
    ALERT_EVENT, CONNECTION_ERROR_EVENT, ConnectionProfile, LEGACY_ESTABLISHED_EVENTS,
    LEGACY_FAILED_EVENTS, MESSAGE_EVENT, PRESENCE_CHANNEL, STATE_CHANGE_EVENT,
    STATUS_CONNECTED, STATUS_CONNECTING, STATUS_DISCONNECTED, StatusBinding,
};

// ============================================================================
// Constants
// ============================================================================

/// Location the flash socket shim loads its bridge from.
pub const SWF_LOCATION: &str = "/WebSocketMain.swf";

/// Event sent by [`ConnectionAdapter::trigger_client_event`].
pub const CLIENT_EVENT: &str = "client-event";

/// Payload sent by [`ConnectionAdapter::trigger_client_event`].
const CLIENT_EVENT_DATA: &str = "hello client";

// ============================================================================
// Binding
// ============================================================================

/// One library-side binding made by the adapter.
struct Binding {
    source: Arc<dyn EventSource>,
    event: &'static str,
    id: SubscriptionId,
}

// ============================================================================
// ConnectionAdapter
// ============================================================================

/// Open client plus every binding made on it.
pub struct ConnectionAdapter {
    profile: ConnectionProfile,
    client: Arc<dyn ClientHandle>,
    channels: Vec<Arc<dyn ChannelHandle>>,
    bindings: Vec<Binding>,
}

impl ConnectionAdapter {
    /// Opens the client as `plan` prescribes and wires its events to `bus`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LibraryShape`] if the library lacks what the plan
    /// requires: a socket shim for flash fallback, channel handles for the
    /// mid and modern profiles, or the nested connection handle for
    /// `state_change` status tracking.
    pub fn open(
        plan: &CompatibilityPlan,
        library: &dyn RealtimeLibrary,
        key: &str,
        name: &str,
        bus: &EventBus,
    ) -> Result<Self> {
        let logger = debug_logger(bus.clone());

        configure_shim(plan, library, &logger)?;

        let options = match plan.profile {
            ConnectionProfile::Legacy => ConnectOptions::Positional {
                channel: PRESENCE_CHANNEL.to_string(),
            },
            ConnectionProfile::Mid => ConnectOptions::Options(ClientOptions::with_auth(name)),
            ConnectionProfile::Modern => {
                ConnectOptions::Options(ClientOptions::encrypted_ws(name))
            }
        };

        debug!(profile = ?plan.profile, key, name, "Opening client");
        let client = library.open(key, options, logger);

        let mut adapter = Self {
            profile: plan.profile,
            client,
            channels: Vec::new(),
            bindings: Vec::new(),
        };

        if let Err(e) = adapter.attach(plan, bus) {
            warn!(error = %e, "Client does not match its version, abandoning it");
            adapter.detach();
            adapter.client.disconnect();
            return Err(e);
        }

        debug!(
            profile = ?adapter.profile,
            channels = adapter.channels.len(),
            bindings = adapter.bindings.len(),
            "Connection adapter ready"
        );

        Ok(adapter)
    }

    // ========================================================================
    // Setup
    // ========================================================================

    fn attach(&mut self, plan: &CompatibilityPlan, bus: &EventBus) -> Result<()> {
        self.bind_messages(bus)?;

        if plan.logs_session_id {
            match self.client.session_id() {
                Some(id) => {
                    bus.emit(NormalizedEvent::debug(format!("session id: {id}")));
                }
                None => warn!("Client reports no session id"),
            }
        }

        match plan.status_binding {
            StatusBinding::LegacyEvents => self.bind_legacy_status(bus),
            StatusBinding::StateChange => self.bind_state_change(bus)?,
        }
        Ok(())
    }

    fn bind_messages(&mut self, bus: &EventBus) -> Result<()> {
        if self.profile.binds_on_root() {
            let root: Arc<dyn EventSource> = Arc::clone(&self.client) as Arc<dyn EventSource>;
            self.bind(&root, MESSAGE_EVENT, message_callback(bus, None));
            self.bind(&root, ALERT_EVENT, alert_callback(bus));
            return Ok(());
        }

        let tags = self.profile.tags_messages();
        for &channel_name in self.profile.channels() {
            let channel = self.client.subscribe(channel_name).ok_or_else(|| {
                Error::library_shape(format!("subscribe({channel_name}) returned no channel"))
            })?;
            trace!(channel = channel_name, "Subscribed");

            let tag = tags.then(|| channel_name.to_string());
            let source: Arc<dyn EventSource> = Arc::clone(&channel) as Arc<dyn EventSource>;
            self.bind(&source, MESSAGE_EVENT, message_callback(bus, tag));
            self.bind(&source, ALERT_EVENT, alert_callback(bus));
            self.channels.push(channel);
        }

        Ok(())
    }

    fn bind_legacy_status(&mut self, bus: &EventBus) {
        bus.emit(NormalizedEvent::status(STATUS_CONNECTING));

        let root: Arc<dyn EventSource> = Arc::clone(&self.client) as Arc<dyn EventSource>;
        for event in LEGACY_ESTABLISHED_EVENTS {
            self.bind(&root, event, status_callback(bus, STATUS_CONNECTED));
        }
        for event in LEGACY_FAILED_EVENTS {
            self.bind(&root, event, status_callback(bus, STATUS_DISCONNECTED));
        }
    }

    fn bind_state_change(&mut self, bus: &EventBus) -> Result<()> {
        let connection = self
            .client
            .connection()
            .ok_or_else(|| Error::library_shape("client has no nested connection handle"))?;

        let status_bus = bus.clone();
        self.bind(
            &connection,
            STATE_CHANGE_EVENT,
            Arc::new(move |state: &Value| match &state["current"] {
                Value::String(current) => {
                    status_bus.emit(NormalizedEvent::status(current.as_str()));
                }
                Value::Null => trace!(%state, "state_change without current state"),
                other => {
                    status_bus.emit(NormalizedEvent::status(other.to_string()));
                }
            }),
        );

        let error_bus = bus.clone();
        self.bind(
            &connection,
            CONNECTION_ERROR_EVENT,
            Arc::new(move |error: &Value| {
                error_bus.emit(NormalizedEvent::error(error.clone()));
            }),
        );

        Ok(())
    }

    fn bind(&mut self, source: &Arc<dyn EventSource>, event: &'static str, callback: EventCallback) {
        let id = source.bind(event, callback);
        trace!(event, %id, "Library event bound");
        self.bindings.push(Binding {
            source: Arc::clone(source),
            event,
            id,
        });
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Asks the library to (re)connect.
    pub fn connect(&self) {
        debug!("Connect requested");
        self.client.connect();
    }

    /// Asks the library to disconnect.
    pub fn disconnect(&self) {
        debug!("Disconnect requested");
        self.client.disconnect();
    }

    /// Sends `client-event` with `{"data": "hello client"}` on the last
    /// subscribed channel. Returns whether the library accepted it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoChannel`] under the legacy profile, which has no
    /// channel handle.
    pub fn trigger_client_event(&self) -> Result<bool> {
        let channel = self.channels.last().ok_or(Error::NoChannel)?;
        let accepted = channel.trigger(CLIENT_EVENT, &json!({ "data": CLIENT_EVENT_DATA }));
        debug!(channel = channel.name(), accepted, "Client event triggered");
        Ok(accepted)
    }

    /// Session identifier reported by the library.
    #[inline]
    #[must_use]
    pub fn session_id(&self) -> Option<String> {
        self.client.session_id()
    }

    /// Subscribed channel names in subscription order.
    #[must_use]
    pub fn channels(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    /// Profile the client was opened with.
    #[inline]
    #[must_use]
    pub fn profile(&self) -> ConnectionProfile {
        self.profile
    }

    /// Number of live library bindings.
    #[inline]
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Removes every library binding made by this adapter.
    ///
    /// Returns how many were still bound.
    pub fn detach(&mut self) -> usize {
        let removed = self
            .bindings
            .drain(..)
            .filter(|b| b.source.unbind(b.event, b.id))
            .count();
        debug!(removed, "Connection adapter detached");
        removed
    }
}

impl Drop for ConnectionAdapter {
    fn drop(&mut self) {
        if !self.bindings.is_empty() {
            self.detach();
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Logger handed to the library and shim: mirrors to tracing, emits `debug`.
fn debug_logger(bus: EventBus) -> DebugLogger {
    Arc::new(move |text: &str| {
        trace!(target: "pusher_compat::library", "{text}");
        bus.emit(NormalizedEvent::debug(text));
    })
}

/// Configures the socket shim when the build ships one.
fn configure_shim(
    plan: &CompatibilityPlan,
    library: &dyn RealtimeLibrary,
    logger: &DebugLogger,
) -> Result<()> {
    let Some(shim) = library.socket_shim() else {
        if plan.flash_fallback {
            return Err(Error::library_shape(format!(
                "version {} requires the flash socket shim",
                plan.version
            )));
        }
        return Ok(());
    };

    let swf_location = plan.flash_fallback.then(|| SWF_LOCATION.to_string());
    debug!(swf_location = ?swf_location, "Configuring socket shim");
    shim.configure(ShimSettings {
        swf_location,
        debug: true,
        logger: Arc::clone(logger),
    });
    Ok(())
}

fn message_callback(bus: &EventBus, tag: Option<String>) -> EventCallback {
    let bus = bus.clone();
    Arc::new(move |data: &Value| {
        bus.emit(NormalizedEvent::message(data.clone(), tag.clone()));
    })
}

fn alert_callback(bus: &EventBus) -> EventCallback {
    let bus = bus.clone();
    Arc::new(move |data: &Value| {
        bus.emit(NormalizedEvent::alert(data.clone()));
    })
}

fn status_callback(bus: &EventBus, status: &'static str) -> EventCallback {
    let bus = bus.clone();
    Arc::new(move |_: &Value| {
        bus.emit(NormalizedEvent::status(status));
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use parking_lot::Mutex;

    use crate::library::{SimulatedClient, SimulatedLibrary};
    use crate::transport::Environment;
    use crate::version::Version;

    struct Fixture {
        library: SimulatedLibrary,
        bus: EventBus,
        seen: Arc<Mutex<Vec<NormalizedEvent>>>,
    }

    impl Fixture {
        fn new(version: Version) -> Self {
            let bus = EventBus::new();
            let seen = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&seen);
            bus.subscribe_all(Arc::new(move |event: &NormalizedEvent| {
                sink.lock().push(event.clone());
            }));
            Self {
                library: SimulatedLibrary::new(version).with_default_transports(),
                bus,
                seen,
            }
        }

        fn open(&self, encrypted: bool) -> Result<ConnectionAdapter> {
            let plan = CompatibilityPlan::resolve(
                self.library.simulated_version(),
                Environment::new(encrypted),
            );
            ConnectionAdapter::open(&plan, &self.library, "key", "test", &self.bus)
        }

        fn client(&self) -> Arc<SimulatedClient> {
            self.library.client().expect("client opened")
        }

        fn events(&self) -> Vec<NormalizedEvent> {
            self.seen.lock().clone()
        }
    }

    #[test]
    fn test_modern_profile_tags_messages() {
        let fx = Fixture::new(Version::new(1, 6, 0));
        let adapter = fx.open(true).expect("open");

        assert_eq!(adapter.channels().len(), 4);
        assert_eq!(
            fx.client().options(),
            &ConnectOptions::Options(ClientOptions::encrypted_ws("test"))
        );

        let channel = fx.client().channel("public-channel").expect("channel");
        channel.emit(MESSAGE_EVENT, &json!({"n": 1}));

        assert!(fx.events().contains(&NormalizedEvent::message(
            json!({"n": 1}),
            Some("public-channel".into())
        )));
    }

    #[test]
    fn test_mid_profile_untagged_messages() {
        let fx = Fixture::new(Version::new(1, 4, 2));
        let adapter = fx.open(true).expect("open");

        assert_eq!(adapter.channels(), vec!["presence-channel"]);
        fx.client()
            .channel("presence-channel")
            .expect("channel")
            .emit(MESSAGE_EVENT, &json!("hi"));

        assert!(fx.events().contains(&NormalizedEvent::message(json!("hi"), None)));
    }

    #[test]
    fn test_legacy_binds_on_root() {
        let fx = Fixture::new(Version::new(1, 3, 0));
        let adapter = fx.open(false).expect("open");
        let client = fx.client();

        assert!(adapter.channels().is_empty());
        assert_eq!(
            client.options(),
            &ConnectOptions::Positional {
                channel: "presence-channel".into()
            }
        );

        client.root().emit(ALERT_EVENT, &json!("fire"));
        assert!(fx.events().contains(&NormalizedEvent::alert(json!("fire"))));
    }

    #[test]
    fn test_legacy_status_sequence() {
        let fx = Fixture::new(Version::new(1, 8, 0));
        let _adapter = fx.open(false).expect("open");
        let client = fx.client();

        assert_eq!(fx.events().last(), Some(&NormalizedEvent::status("connecting")));
        let bound = client.root().bound_events();
        for event in LEGACY_ESTABLISHED_EVENTS.iter().chain(&LEGACY_FAILED_EVENTS) {
            assert!(bound.contains(&event.to_string()), "{event} not bound");
        }

        client.root().emit("connection_established", &Value::Null);
        client.root().emit("pusher:connection_failed", &Value::Null);

        let statuses: Vec<_> = fx
            .events()
            .into_iter()
            .filter_map(|e| match e {
                NormalizedEvent::Status(s) => Some(s),
                _ => None,
            })
            .collect();
        assert_eq!(statuses, vec!["connecting", "connected", "disconnected"]);
    }

    #[test]
    fn test_prefixed_established_event_reports_connected() {
        let fx = Fixture::new(Version::new(1, 8, 0));
        let _adapter = fx.open(false).expect("open");
        let client = fx.client();

        assert_eq!(client.root().binding_count("pusher:connection_established"), 1);

        // 1.4 through 1.8 fire only the prefixed spelling
        client.run_pending();

        assert_eq!(fx.events().last(), Some(&NormalizedEvent::status("connected")));
    }

    #[test]
    fn test_shape_mismatch_abandons_client() {
        let library = SimulatedLibrary::new(Version::new(1, 3, 0)).with_default_transports();
        let plan = CompatibilityPlan::resolve(Version::new(2, 0, 0), Environment::new(false));
        let bus = EventBus::new();

        let err = ConnectionAdapter::open(&plan, &library, "k", "n", &bus)
            .err()
            .expect("error");
        assert!(err.is_library_error());

        let client = library.client().expect("client opened");
        assert!(client.root().bound_events().is_empty());
        assert_eq!(library.journal().last().map(String::as_str), Some("disconnect"));

        client.run_pending();
        assert_eq!(client.state(), "disconnected");
    }

    #[test]
    fn test_state_change_status_and_errors() {
        let fx = Fixture::new(Version::new(2, 2, 0));
        let _adapter = fx.open(false).expect("open");
        let client = fx.client();

        client.run_pending();
        client.fail(json!({"type": "PusherError"}));

        let events = fx.events();
        assert!(events.contains(&NormalizedEvent::status("connecting")));
        assert!(events.contains(&NormalizedEvent::status("connected")));
        assert!(events.contains(&NormalizedEvent::error(json!({"type": "PusherError"}))));
        assert!(!client.root().bound_events().contains(&"connection_established".to_string()));
    }

    #[test]
    fn test_session_id_debug_entry() {
        let fx = Fixture::new(Version::new(2, 0, 0));
        let adapter = fx.open(false).expect("open");
        let id = adapter.session_id().expect("session id");

        assert!(fx.events().contains(&NormalizedEvent::debug(format!("session id: {id}"))));

        let older = Fixture::new(Version::new(1, 9, 5));
        let _adapter = older.open(false).expect("open");
        assert!(
            !older
                .events()
                .iter()
                .any(|e| matches!(e, NormalizedEvent::Debug(t) if t.starts_with("session id")))
        );
    }

    #[test]
    fn test_flash_fallback_configures_shim_first() {
        let fx = Fixture::new(Version::new(1, 4, 0));
        let _adapter = fx.open(false).expect("open");

        let settings = fx.library.shim().expect("shim").settings().expect("configured");
        assert_eq!(settings.swf_location.as_deref(), Some(SWF_LOCATION));
        assert!(settings.debug);
        assert_eq!(fx.library.journal()[..2], ["shim.configure", "open key"]);
    }

    #[test]
    fn test_shim_debug_without_swf_redirect() {
        let fx = Fixture::new(Version::new(1, 6, 0));
        let _adapter = fx.open(false).expect("open");

        let settings = fx.library.shim().expect("shim").settings().expect("configured");
        assert!(settings.swf_location.is_none());
        assert!(settings.debug);
    }

    #[test]
    fn test_missing_shim_is_library_shape_error() {
        let version = Version::new(1, 4, 0);
        let library = SimulatedLibrary::new(version).without_shim();
        let plan = CompatibilityPlan::resolve(version, Environment::new(false));

        let err = ConnectionAdapter::open(&plan, &library, "k", "n", &EventBus::new())
            .err()
            .expect("error");
        assert!(err.is_library_error());
    }

    #[test]
    fn test_library_logger_emits_debug() {
        let fx = Fixture::new(Version::new(3, 1, 0));
        let _adapter = fx.open(false).expect("open");

        fx.client().log("Connecting via ws");
        assert!(fx.events().contains(&NormalizedEvent::debug("Connecting via ws")));
    }

    #[test]
    fn test_trigger_client_event_uses_last_channel() {
        let fx = Fixture::new(Version::new(2, 0, 0));
        let modern = fx.open(true).expect("open");

        assert!(modern.trigger_client_event().expect("trigger"));
        let last = fx.client().channel("private-encrypted-channel").expect("channel");
        assert_eq!(
            last.triggered(),
            vec![(CLIENT_EVENT.to_string(), json!({"data": "hello client"}))]
        );

        let legacy = Fixture::new(Version::new(1, 3, 0));
        let adapter = legacy.open(false).expect("open");
        assert!(matches!(adapter.trigger_client_event(), Err(Error::NoChannel)));
    }

    #[test]
    fn test_detach_unbinds_everything() {
        let fx = Fixture::new(Version::new(2, 0, 0));
        let mut adapter = fx.open(false).expect("open");
        let client = fx.client();
        let bound = adapter.binding_count();

        assert_eq!(bound, 4);
        assert_eq!(adapter.detach(), bound);
        assert_eq!(adapter.binding_count(), 0);

        let channel = client.channel("presence-channel").expect("channel");
        assert_eq!(channel.emit(MESSAGE_EVENT, &json!(1)), 0);
        assert!(
            client
                .connection_events()
                .expect("connection")
                .bound_events()
                .is_empty()
        );
    }

    #[test]
    fn test_connect_and_disconnect_forwarded() {
        let fx = Fixture::new(Version::new(2, 0, 0));
        let adapter = fx.open(false).expect("open");

        adapter.connect();
        adapter.disconnect();

        assert_eq!(fx.client().state(), "disconnected");
        assert_eq!(fx.events().last(), Some(&NormalizedEvent::status("disconnected")));
    }
}
