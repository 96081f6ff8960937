//! Scripted in-process client library.
//!
//! [`SimulatedLibrary`] exposes the shape of any library version (see the
//! table in [`crate::library`]) without doing network I/O. Support checks
//! go through the same [`SupportSlot`]s the registry wraps, so transport
//! overrides are observable on [`SimulatedClient::connect`].
//!
//! Opening a client never fires events; the automatic first connect is
//! deferred until [`SimulatedClient::run_pending`], the stand-in for the
//! next event-loop turn.
//!
//! # Example
//!
//! ```
//! use pusher_compat::library::{RealtimeLibrary, SimulatedLibrary};
//! use pusher_compat::version::Version;
//!
//! let library = SimulatedLibrary::new(Version::new(2, 1, 0)).with_default_transports();
//! assert_eq!(library.version(), "2.1.0");
//! assert!(library.transport_class("ws").is_some());
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::{Value, json};
use tracing::trace;

use crate::connection::ConnectOptions;
use crate::identifiers::SubscriptionId;
use crate::transport::{Environment, LEGACY_TRANSPORTS, SupportSlot};
use crate::version::Version;
use crate::version::plan::{
    MID_PROFILE, SESSION_ID_LOGGING, STATE_CHANGE_BINDING, UNIFIED_TRANSPORTS,
};

use super::{
    ChannelHandle, ClientHandle, DebugLogger, EventCallback, EventSource, RealtimeLibrary,
    ShimSettings, SocketShim,
};

// ============================================================================
// Types
// ============================================================================

/// Ordered record of library-side calls, shared by library, shim and client.
type Journal = Arc<Mutex<Vec<String>>>;

// ============================================================================
// SimulatedLibrary
// ============================================================================

/// Client library double for a given version.
pub struct SimulatedLibrary {
    version: Version,
    classes: Vec<(String, SupportSlot)>,
    runtime: Vec<(String, Option<SupportSlot>)>,
    shim: Option<Arc<SimulatedShim>>,
    client: Mutex<Option<Arc<SimulatedClient>>>,
    journal: Journal,
    class_lookups: AtomicUsize,
    runtime_reads: AtomicUsize,
    opened: AtomicUsize,
}

impl SimulatedLibrary {
    /// Library of `version` with no transports and a socket shim.
    #[must_use]
    pub fn new(version: Version) -> Self {
        let journal: Journal = Arc::default();
        Self {
            version,
            classes: Vec::new(),
            runtime: Vec::new(),
            shim: Some(Arc::new(SimulatedShim::new(Arc::clone(&journal)))),
            client: Mutex::new(None),
            journal,
            class_lookups: AtomicUsize::new(0),
            runtime_reads: AtomicUsize::new(0),
            opened: AtomicUsize::new(0),
        }
    }

    /// Adds the usual transports in the shape matching the version.
    ///
    /// `flash` is absent; the `xdr_*` transports only work unencrypted.
    #[must_use]
    pub fn with_default_transports(self) -> Self {
        let unified = self.version.at_least(UNIFIED_TRANSPORTS);
        LEGACY_TRANSPORTS
            .iter()
            .filter(|name| **name != "flash")
            .fold(self, |library, name| {
                let xdr = name.starts_with("xdr_");
                let supported = move |env: &Environment| !xdr || !env.encrypted;
                if unified {
                    library.with_runtime_transport(name, supported)
                } else {
                    library.with_transport_class(name, supported)
                }
            })
    }

    /// Adds a top-level transport class.
    #[must_use]
    pub fn with_transport_class(
        mut self,
        name: &str,
        supported: impl Fn(&Environment) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.classes
            .push((name.to_string(), SupportSlot::from_fn(supported)));
        self
    }

    /// Adds an entry to the unified runtime transport table.
    #[must_use]
    pub fn with_runtime_transport(
        mut self,
        name: &str,
        supported: impl Fn(&Environment) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.runtime
            .push((name.to_string(), Some(SupportSlot::from_fn(supported))));
        self
    }

    /// Adds a runtime table entry without a transport class.
    #[must_use]
    pub fn with_absent_runtime_transport(mut self, name: &str) -> Self {
        self.runtime.push((name.to_string(), None));
        self
    }

    /// Removes the socket shim.
    #[must_use]
    pub fn without_shim(mut self) -> Self {
        self.shim = None;
        self
    }

    /// Simulated version.
    #[inline]
    #[must_use]
    pub fn simulated_version(&self) -> Version {
        self.version
    }

    /// Live slot of a transport, from whichever table the version uses.
    #[must_use]
    pub fn slot(&self, name: &str) -> Option<SupportSlot> {
        self.transport_slots()
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(_, slot)| slot)
    }

    /// The socket shim, if the build has one.
    #[must_use]
    pub fn shim(&self) -> Option<Arc<SimulatedShim>> {
        self.shim.clone()
    }

    /// Most recently opened client.
    #[must_use]
    pub fn client(&self) -> Option<Arc<SimulatedClient>> {
        self.client.lock().clone()
    }

    /// Library-side calls in order.
    #[must_use]
    pub fn journal(&self) -> Vec<String> {
        self.journal.lock().clone()
    }

    /// Number of [`RealtimeLibrary::transport_class`] calls.
    #[must_use]
    pub fn transport_class_lookups(&self) -> usize {
        self.class_lookups.load(Ordering::SeqCst)
    }

    /// Number of [`RealtimeLibrary::runtime_transports`] calls.
    #[must_use]
    pub fn runtime_table_reads(&self) -> usize {
        self.runtime_reads.load(Ordering::SeqCst)
    }

    /// Transports the client would try, in preference order.
    fn transport_slots(&self) -> Vec<(String, SupportSlot)> {
        if self.version.at_least(UNIFIED_TRANSPORTS) {
            self.runtime
                .iter()
                .filter_map(|(name, slot)| slot.clone().map(|slot| (name.clone(), slot)))
                .collect()
        } else {
            self.classes.clone()
        }
    }
}

impl RealtimeLibrary for SimulatedLibrary {
    fn version(&self) -> String {
        self.version.to_string()
    }

    fn runtime_transports(&self) -> Vec<(String, Option<SupportSlot>)> {
        self.runtime_reads.fetch_add(1, Ordering::SeqCst);
        self.runtime.clone()
    }

    fn transport_class(&self, name: &str) -> Option<SupportSlot> {
        self.class_lookups.fetch_add(1, Ordering::SeqCst);
        self.classes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, slot)| slot.clone())
    }

    fn socket_shim(&self) -> Option<Arc<dyn SocketShim>> {
        self.shim
            .clone()
            .map(|shim| shim as Arc<dyn SocketShim>)
    }

    fn open(&self, key: &str, options: ConnectOptions, logger: DebugLogger) -> Arc<dyn ClientHandle> {
        let serial = self.opened.fetch_add(1, Ordering::SeqCst) + 1;
        self.journal.lock().push(format!("open {key}"));

        let client = Arc::new(SimulatedClient {
            key: key.to_string(),
            environment: Environment::new(options.is_encrypted()),
            options,
            logger,
            version: self.version,
            root: SimulatedEvents::new(),
            connection: self
                .version
                .at_least(STATE_CHANGE_BINDING)
                .then(|| Arc::new(SimulatedEvents::new())),
            session_id: self
                .version
                .at_least(SESSION_ID_LOGGING)
                .then(|| format!("{}.{}", 4000 + serial, 9000 + serial)),
            transports: self.transport_slots(),
            channels: Mutex::new(Vec::new()),
            state: Mutex::new("initialized".to_string()),
            active_transport: Mutex::new(None),
            pending_connect: AtomicBool::new(true),
            journal: Arc::clone(&self.journal),
        });

        *self.client.lock() = Some(Arc::clone(&client));
        client
    }
}

// ============================================================================
// SimulatedShim
// ============================================================================

/// Flash socket shim double.
pub struct SimulatedShim {
    settings: Mutex<Option<ShimSettings>>,
    journal: Journal,
}

impl SimulatedShim {
    fn new(journal: Journal) -> Self {
        Self {
            settings: Mutex::new(None),
            journal,
        }
    }

    /// Last applied settings.
    #[must_use]
    pub fn settings(&self) -> Option<ShimSettings> {
        self.settings.lock().clone()
    }

    /// Writes a line through the configured debug logger, if debug is on.
    pub fn log(&self, text: &str) {
        let logger = self
            .settings
            .lock()
            .as_ref()
            .filter(|s| s.debug)
            .map(|s| Arc::clone(&s.logger));
        if let Some(logger) = logger {
            logger(text);
        }
    }
}

impl SocketShim for SimulatedShim {
    fn configure(&self, settings: ShimSettings) {
        self.journal.lock().push("shim.configure".to_string());
        *self.settings.lock() = Some(settings);
    }
}

// ============================================================================
// SimulatedEvents
// ============================================================================

/// Event binding table of a root, channel or connection handle.
#[derive(Default)]
pub struct SimulatedEvents {
    handlers: Mutex<FxHashMap<String, Vec<(SubscriptionId, EventCallback)>>>,
}

impl SimulatedEvents {
    /// Creates an empty table.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires `event`; returns how many callbacks ran.
    pub fn emit(&self, event: &str, data: &Value) -> usize {
        let callbacks: Vec<EventCallback> = self
            .handlers
            .lock()
            .get(event)
            .map(|bound| bound.iter().map(|(_, cb)| Arc::clone(cb)).collect())
            .unwrap_or_default();

        for callback in &callbacks {
            callback(data);
        }
        callbacks.len()
    }

    /// Names of events with at least one binding, sorted.
    #[must_use]
    pub fn bound_events(&self) -> Vec<String> {
        let mut events: Vec<String> = self
            .handlers
            .lock()
            .iter()
            .filter(|(_, bound)| !bound.is_empty())
            .map(|(event, _)| event.clone())
            .collect();
        events.sort();
        events
    }

    /// Number of bindings on `event`.
    #[must_use]
    pub fn binding_count(&self, event: &str) -> usize {
        self.handlers.lock().get(event).map_or(0, Vec::len)
    }
}

impl EventSource for SimulatedEvents {
    fn bind(&self, event: &str, callback: EventCallback) -> SubscriptionId {
        let id = SubscriptionId::generate();
        self.handlers
            .lock()
            .entry(event.to_string())
            .or_default()
            .push((id, callback));
        id
    }

    fn unbind(&self, event: &str, binding: SubscriptionId) -> bool {
        let mut handlers = self.handlers.lock();
        let Some(bound) = handlers.get_mut(event) else {
            return false;
        };
        let before = bound.len();
        bound.retain(|(id, _)| *id != binding);
        bound.len() != before
    }
}

// ============================================================================
// SimulatedChannel
// ============================================================================

/// Subscribed channel double.
pub struct SimulatedChannel {
    name: String,
    events: SimulatedEvents,
    triggered: Mutex<Vec<(String, Value)>>,
}

impl SimulatedChannel {
    /// Fires a server event on this channel.
    pub fn emit(&self, event: &str, data: &Value) -> usize {
        self.events.emit(event, data)
    }

    /// Binding table of this channel.
    #[must_use]
    pub fn events(&self) -> &SimulatedEvents {
        &self.events
    }

    /// Client events triggered on this channel.
    #[must_use]
    pub fn triggered(&self) -> Vec<(String, Value)> {
        self.triggered.lock().clone()
    }
}

impl EventSource for SimulatedChannel {
    fn bind(&self, event: &str, callback: EventCallback) -> SubscriptionId {
        self.events.bind(event, callback)
    }

    fn unbind(&self, event: &str, binding: SubscriptionId) -> bool {
        self.events.unbind(event, binding)
    }
}

impl ChannelHandle for SimulatedChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn trigger(&self, event: &str, data: &Value) -> bool {
        self.triggered
            .lock()
            .push((event.to_string(), data.clone()));
        true
    }
}

// ============================================================================
// SimulatedClient
// ============================================================================

/// Client double returned by [`SimulatedLibrary::open`].
pub struct SimulatedClient {
    key: String,
    options: ConnectOptions,
    environment: Environment,
    logger: DebugLogger,
    version: Version,
    root: SimulatedEvents,
    connection: Option<Arc<SimulatedEvents>>,
    session_id: Option<String>,
    transports: Vec<(String, SupportSlot)>,
    channels: Mutex<Vec<Arc<SimulatedChannel>>>,
    state: Mutex<String>,
    active_transport: Mutex<Option<String>>,
    pending_connect: AtomicBool,
    journal: Journal,
}

impl SimulatedClient {
    /// Application key passed to `open`.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Constructor arguments passed to `open`.
    #[must_use]
    pub fn options(&self) -> &ConnectOptions {
        &self.options
    }

    /// Root binding table.
    #[must_use]
    pub fn root(&self) -> &SimulatedEvents {
        &self.root
    }

    /// Nested connection binding table (`>= 1.9.0`).
    #[must_use]
    pub fn connection_events(&self) -> Option<Arc<SimulatedEvents>> {
        self.connection.clone()
    }

    /// A subscribed channel by name.
    #[must_use]
    pub fn channel(&self, name: &str) -> Option<Arc<SimulatedChannel>> {
        self.channels
            .lock()
            .iter()
            .find(|c| c.name == name)
            .cloned()
    }

    /// Names of subscribed channels in subscription order.
    #[must_use]
    pub fn channel_names(&self) -> Vec<String> {
        self.channels.lock().iter().map(|c| c.name.clone()).collect()
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> String {
        self.state.lock().clone()
    }

    /// Transport chosen by the last successful connect.
    #[must_use]
    pub fn active_transport(&self) -> Option<String> {
        self.active_transport.lock().clone()
    }

    /// Writes through the injected library logger.
    pub fn log(&self, text: &str) {
        (self.logger)(text);
    }

    /// Runs the automatic connect scheduled by `open`, once.
    pub fn run_pending(&self) {
        if self.pending_connect.swap(false, Ordering::SeqCst) {
            self.connect();
        }
    }

    /// Reports a connection error (`>= 1.9.0` only).
    pub fn fail(&self, error: Value) {
        if let Some(connection) = &self.connection {
            connection.emit("error", &error);
        }
    }

    fn transition(&self, current: &str) {
        let previous = std::mem::replace(&mut *self.state.lock(), current.to_string());
        trace!(%previous, current, "Simulated state change");
        if let Some(connection) = &self.connection {
            connection.emit(
                "state_change",
                &json!({ "previous": previous, "current": current }),
            );
        }
    }

    /// Legacy spelling of connection events: unprefixed before `1.4.0`.
    fn legacy_event(&self, suffix: &str) -> String {
        if self.version.below(MID_PROFILE) {
            suffix.to_string()
        } else {
            format!("pusher:{suffix}")
        }
    }
}

impl EventSource for SimulatedClient {
    fn bind(&self, event: &str, callback: EventCallback) -> SubscriptionId {
        self.root.bind(event, callback)
    }

    fn unbind(&self, event: &str, binding: SubscriptionId) -> bool {
        self.root.unbind(event, binding)
    }
}

impl ClientHandle for SimulatedClient {
    fn subscribe(&self, channel: &str) -> Option<Arc<dyn ChannelHandle>> {
        if self.version.below(MID_PROFILE) {
            return None;
        }

        self.journal.lock().push(format!("subscribe {channel}"));
        let handle = self.channel(channel).unwrap_or_else(|| {
            let created = Arc::new(SimulatedChannel {
                name: channel.to_string(),
                events: SimulatedEvents::new(),
                triggered: Mutex::new(Vec::new()),
            });
            self.channels.lock().push(Arc::clone(&created));
            created
        });
        Some(handle as Arc<dyn ChannelHandle>)
    }

    fn connection(&self) -> Option<Arc<dyn EventSource>> {
        self.connection
            .clone()
            .map(|events| events as Arc<dyn EventSource>)
    }

    fn session_id(&self) -> Option<String> {
        self.session_id.clone()
    }

    fn connect(&self) {
        self.pending_connect.store(false, Ordering::SeqCst);
        self.journal.lock().push("connect".to_string());
        self.transition("connecting");

        let chosen = self
            .transports
            .iter()
            .find(|(_, slot)| slot.check(&self.environment))
            .map(|(name, _)| name.clone());

        match chosen {
            Some(name) => {
                self.log(&format!("Connecting via {name}"));
                *self.active_transport.lock() = Some(name);
                self.transition("connected");
                if self.connection.is_none() {
                    let event = self.legacy_event("connection_established");
                    self.root.emit(&event, &json!({ "socket_id": "1.1" }));
                }
            }
            None => {
                self.log("No supported transport");
                *self.active_transport.lock() = None;
                self.transition("unavailable");
                if self.connection.is_none() {
                    let event = self.legacy_event("connection_failed");
                    self.root.emit(&event, &Value::Null);
                }
            }
        }
    }

    fn disconnect(&self) {
        self.pending_connect.store(false, Ordering::SeqCst);
        self.journal.lock().push("disconnect".to_string());
        *self.active_transport.lock() = None;
        self.transition("disconnected");
    }
}

// ============================================================================
// Tests
// ============================================================================
