//! Session composition root.
//!
//! [`Session::start`] performs the page's whole startup sequence:
//!
//! 1. Validate the configuration and detect the library version
//! 2. Resolve the [`CompatibilityPlan`]
//! 3. Bind the log toggles
//! 4. Build the transport registry and bind the transport toggles
//! 5. Route normalized events to the log, status line and notifier
//! 6. Open the connection
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use pusher_compat::library::SimulatedLibrary;
//! use pusher_compat::session::{MemorySurface, Session};
//! use pusher_compat::version::Version;
//! use pusher_compat::SessionConfig;
//!
//! let library = Arc::new(SimulatedLibrary::new(Version::new(2, 0, 0)).with_default_transports());
//! let surface = MemorySurface::standard();
//!
//! let config = SessionConfig::new("app-key").with_name("dev").with_transport("ws");
//! let session = Session::start(config, library.clone(), surface.surface())?;
//!
//! library.client().expect("client").run_pending();
//! assert_eq!(surface.status.text().as_deref(), Some("connected"));
//! assert!(!session.overrides().is_forced_off("ws"));
//! # Ok::<(), pusher_compat::Error>(())
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::connection::{ConnectionAdapter, EventBus, NormalizedEvent};
use crate::error::Result;
use crate::identifiers::SubscriptionId;
use crate::library::RealtimeLibrary;
use crate::log::LogRouter;
use crate::transport::{TransportOverrideController, TransportOverrides, TransportRegistry};
use crate::ui::Toggle;
use crate::version::CompatibilityPlan;

use super::surface::Surface;

// ============================================================================
// Session
// ============================================================================

/// A running control-surface session.
pub struct Session {
    plan: CompatibilityPlan,
    registry: TransportRegistry,
    overrides: TransportOverrides,
    log: LogRouter,
    bus: EventBus,
    adapter: ConnectionAdapter,
    log_toggles: Vec<(Arc<dyn Toggle>, SubscriptionId)>,
    routes: Vec<SubscriptionId>,
    closed: bool,
}

impl Session {
    /// Starts a session against `library` on `surface`.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`](crate::Error::Config) if the configuration is invalid
    /// - [`Error::InvalidVersion`](crate::Error::InvalidVersion) if the
    ///   library reports a malformed version
    /// - [`Error::LibraryShape`](crate::Error::LibraryShape) if the library
    ///   does not match its version
    ///
    /// On failure every toggle handler is detached and every transport
    /// slot is back on its native predicate.
    pub fn start(
        config: SessionConfig,
        library: Arc<dyn RealtimeLibrary>,
        surface: Surface,
    ) -> Result<Self> {
        config.validate()?;

        let version = config.resolve_version(library.as_ref())?;
        let environment = config.environment();
        let plan = CompatibilityPlan::resolve(version, environment);

        let mut log = LogRouter::new(config.visibility());
        if let Some(sink) = surface.sink.clone() {
            log = log.with_sink(sink);
        }
        let log_toggles = log.bind_toggles(surface.toggles.as_ref());

        let registry = TransportRegistry::build(plan.registry_shape, library.as_ref());
        let overrides = TransportOverrideController::new()
            .with_log(log.clone())
            .initialize(
                &registry,
                environment,
                &config.enabled_transports,
                surface.toggles.as_ref(),
            );

        let bus = EventBus::new();
        let routes = route_events(&bus, &log, &surface);

        let adapter =
            match ConnectionAdapter::open(&plan, library.as_ref(), &config.key, &config.name, &bus)
            {
                Ok(adapter) => adapter,
                Err(e) => {
                    warn!(error = %e, "Connection setup failed, unwinding session");
                    for (toggle, subscription) in log_toggles {
                        toggle.remove_handler(subscription);
                    }
                    for route in routes {
                        bus.unsubscribe(route);
                    }
                    // overrides restore on drop
                    return Err(e);
                }
            };

        info!(
            %version,
            profile = ?plan.profile,
            transports = registry.len(),
            "Session started"
        );

        Ok(Self {
            plan,
            registry,
            overrides,
            log,
            bus,
            adapter,
            log_toggles,
            routes,
            closed: false,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The plan resolved at start.
    #[inline]
    #[must_use]
    pub fn plan(&self) -> &CompatibilityPlan {
        &self.plan
    }

    /// Transport descriptors.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &TransportRegistry {
        &self.registry
    }

    /// Live transport overrides.
    #[inline]
    #[must_use]
    pub fn overrides(&self) -> &TransportOverrides {
        &self.overrides
    }

    /// Session log.
    #[inline]
    #[must_use]
    pub fn log(&self) -> &LogRouter {
        &self.log
    }

    /// Normalized event bus.
    #[inline]
    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Connection adapter.
    #[inline]
    #[must_use]
    pub fn adapter(&self) -> &ConnectionAdapter {
        &self.adapter
    }

    /// Whether [`close`](Self::close) has run.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Connect button.
    pub fn connect(&self) {
        self.adapter.connect();
    }

    /// Disconnect button.
    pub fn disconnect(&self) {
        self.adapter.disconnect();
    }

    /// Client-event button.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoChannel`](crate::Error::NoChannel) under the
    /// legacy profile.
    pub fn trigger_client_event(&self) -> Result<bool> {
        self.adapter.trigger_client_event()
    }

    /// Tears down every binding and restores transport support.
    ///
    /// The log history is kept. Calling this twice is a no-op.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        let unbound = self.adapter.detach();
        self.overrides.restore_all();
        self.registry.restore_all();

        for (toggle, subscription) in self.log_toggles.drain(..) {
            toggle.remove_handler(subscription);
        }
        for route in self.routes.drain(..) {
            self.bus.unsubscribe(route);
        }

        debug!(unbound, "Session closed");
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

// ============================================================================
// Routing
// ============================================================================

/// Subscribes the log, status line and notifier to the bus.
fn route_events(bus: &EventBus, log: &LogRouter, surface: &Surface) -> Vec<SubscriptionId> {
    let recorder = log.clone();
    let status = Arc::clone(&surface.status);
    let notifier = Arc::clone(&surface.notifier);

    vec![
        bus.subscribe_all(Arc::new(move |event: &NormalizedEvent| {
            recorder.record(event);
        })),
        bus.on_status(move |text| status.set_text(text)),
        bus.on_alert(move |payload| notifier.notify(payload)),
    ]
}

// ============================================================================
// Tests
// ============================================================================
