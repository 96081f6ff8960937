//! Runtime transport overrides bound to UI toggles.
//!
//! Each transport's `transport_<name>` toggle drives its support slot:
//! checked restores the library's native predicate, unchecked installs an
//! always-false one. The native predicate is captured by the descriptor
//! and is never lost.
//!
//! | Native support | In allow-list | Checked | Interactable |
//! |----------------|---------------|---------|--------------|
//! | yes | yes | yes | yes |
//! | yes | no | no | yes |
//! | no | any | no | no |

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use crate::identifiers::{SubscriptionId, ToggleId};
use crate::log::{LogCategory, LogRouter};
use crate::ui::{ChangeHandler, Toggle, ToggleBoard};

use super::predicate::Environment;
use super::registry::{TransportDescriptor, TransportRegistry};

// ============================================================================
// TransportOverrideController
// ============================================================================

/// Binds transport toggles to live support overrides.
#[derive(Clone, Default)]
pub struct TransportOverrideController {
    log: Option<LogRouter>,
}

impl TransportOverrideController {
    /// Creates a controller that does not log.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits a `debug` entry for every applied override.
    #[inline]
    #[must_use]
    pub fn with_log(mut self, log: LogRouter) -> Self {
        self.log = Some(log);
        self
    }

    /// Binds every descriptor in `registry` to its toggle on `board`.
    ///
    /// Names in `enabled` that the registry does not know are ignored.
    /// The change handler runs once right after registration, so each
    /// slot starts out matching its toggle.
    pub fn initialize(
        &self,
        registry: &TransportRegistry,
        environment: Environment,
        enabled: &FxHashSet<String>,
        board: &dyn ToggleBoard,
    ) -> TransportOverrides {
        let mut bindings = Vec::with_capacity(registry.len());

        for descriptor in registry.iter() {
            let native = descriptor.native_support(&environment);
            let initially_enabled = native && enabled.contains(descriptor.name());
            let handler = self.change_handler(descriptor.clone());

            let Some(toggle) = board.toggle(&ToggleId::transport(descriptor.name())) else {
                debug!(
                    transport = descriptor.name(),
                    initially_enabled,
                    "No toggle for transport, applying initial state directly"
                );
                handler(initially_enabled);
                bindings.push(OverrideBinding {
                    descriptor: descriptor.clone(),
                    toggle: None,
                });
                continue;
            };

            toggle.set_checked(initially_enabled);
            toggle.set_enabled(native);

            let subscription = toggle.on_change(Arc::clone(&handler));
            handler(toggle.is_checked());

            debug!(
                transport = descriptor.name(),
                native,
                initially_enabled,
                "Transport toggle bound"
            );

            bindings.push(OverrideBinding {
                descriptor: descriptor.clone(),
                toggle: Some((toggle, subscription)),
            });
        }

        TransportOverrides { bindings }
    }

    /// Handler swapping `descriptor`'s slot to follow the checked state.
    fn change_handler(&self, descriptor: TransportDescriptor) -> ChangeHandler {
        let log = self.log.clone();
        Arc::new(move |checked: bool| {
            descriptor.apply(checked);

            let state = if checked { "enabled" } else { "disabled" };
            trace!(transport = descriptor.name(), state, "Transport override applied");
            if let Some(log) = &log {
                log.append(
                    LogCategory::Debug,
                    format!("transport {} {state}", descriptor.name()),
                );
            }
        })
    }
}

// ============================================================================
// TransportOverrides
// ============================================================================

/// Live bindings produced by [`TransportOverrideController::initialize`].
pub struct TransportOverrides {
    bindings: Vec<OverrideBinding>,
}

struct OverrideBinding {
    descriptor: TransportDescriptor,
    toggle: Option<(Arc<dyn Toggle>, SubscriptionId)>,
}

impl TransportOverrides {
    /// Returns `true` if `name`'s slot holds something other than its
    /// native predicate.
    #[must_use]
    pub fn is_forced_off(&self, name: &str) -> bool {
        self.bindings
            .iter()
            .any(|b| b.descriptor.name() == name && !b.descriptor.is_original())
    }

    /// Names of bound transports, in registry order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(|b| b.descriptor.name())
    }

    /// Detaches every change handler and restores native predicates.
    ///
    /// The handle is empty afterwards. Also runs on drop.
    pub fn restore_all(&mut self) {
        if self.bindings.is_empty() {
            return;
        }
        for binding in self.bindings.drain(..) {
            if let Some((toggle, subscription)) = binding.toggle {
                toggle.remove_handler(subscription);
            }
            binding.descriptor.restore();
        }
        debug!("Transport overrides restored");
    }

    /// Number of bound transports.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` if nothing was bound.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Drop for TransportOverrides {
    fn drop(&mut self) {
        self.restore_all();
    }
}

// ============================================================================
// Tests
// ============================================================================
