//! Transport capability registry.
//!
//! Builds the `name → descriptor` mapping for the detected library
//! version. The library moved its transport table at `3.1.0`:
//!
//! | Shape | Versions | Source |
//! |-------|----------|--------|
//! | [`RegistryShape::Unified`] | `>= 3.1.0` | Runtime transport table |
//! | [`RegistryShape::Legacy`] | `< 3.1.0` | Seven top-level transport classes |
//!
//! Transports missing from a build are skipped, not reported.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::library::RealtimeLibrary;

use super::predicate::{Environment, SupportPredicate, SupportSlot, never_supported};

// ============================================================================
// Constants
// ============================================================================

/// Transport identifiers resolved against top-level classes before `3.1.0`.
pub const LEGACY_TRANSPORTS: [&str; 7] = [
    "ws",
    "flash",
    "sockjs",
    "xhr_streaming",
    "xdr_streaming",
    "xhr_polling",
    "xdr_polling",
];

// ============================================================================
// RegistryShape
// ============================================================================

/// Where the library keeps its transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryShape {
    /// Unified runtime transport table (`>= 3.1.0`).
    Unified,
    /// Enumerated top-level transport classes (`< 3.1.0`).
    Legacy,
}

// ============================================================================
// TransportDescriptor
// ============================================================================

/// A transport's name, its native predicate and its live predicate slot.
///
/// The slot is shared with the library; the original predicate is captured
/// when the descriptor is created and is never lost.
#[derive(Clone)]
pub struct TransportDescriptor {
    name: String,
    original: SupportPredicate,
    slot: SupportSlot,
}

impl TransportDescriptor {
    /// Wraps a library slot, capturing its current predicate as original.
    #[must_use]
    pub fn wrap(name: impl Into<String>, slot: SupportSlot) -> Self {
        Self {
            name: name.into(),
            original: slot.get(),
            slot,
        }
    }

    /// Transport identifier.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluates the library's native predicate, ignoring overrides.
    #[inline]
    #[must_use]
    pub fn native_support(&self, environment: &Environment) -> bool {
        (self.original)(environment)
    }

    /// Evaluates the active predicate, as the library would.
    #[inline]
    #[must_use]
    pub fn is_supported(&self, environment: &Environment) -> bool {
        self.slot.check(environment)
    }

    /// Puts the original predicate back.
    #[inline]
    pub fn restore(&self) {
        self.slot.set(Arc::clone(&self.original));
    }

    /// Forces the transport unsupported.
    #[inline]
    pub fn disable(&self) {
        self.slot.set(never_supported());
    }

    /// Restores when `enabled`, disables otherwise.
    #[inline]
    pub fn apply(&self, enabled: bool) {
        if enabled {
            self.restore();
        } else {
            self.disable();
        }
    }

    /// Returns `true` if the active predicate is the original one.
    #[inline]
    #[must_use]
    pub fn is_original(&self) -> bool {
        self.slot.holds(&self.original)
    }

    /// The live slot shared with the library.
    #[inline]
    #[must_use]
    pub fn slot(&self) -> &SupportSlot {
        &self.slot
    }
}

impl std::fmt::Debug for TransportDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportDescriptor")
            .field("name", &self.name)
            .field("original", &self.is_original())
            .finish()
    }
}

// ============================================================================
// TransportRegistry
// ============================================================================

/// Ordered `name → descriptor` mapping for one session.
#[derive(Debug, Clone)]
pub struct TransportRegistry {
    shape: RegistryShape,
    descriptors: Vec<TransportDescriptor>,
    index: FxHashMap<String, usize>,
}

impl TransportRegistry {
    /// Builds the registry from the library using `shape`.
    #[must_use]
    pub fn build(shape: RegistryShape, library: &dyn RealtimeLibrary) -> Self {
        let entries: Vec<(String, Option<SupportSlot>)> = match shape {
            RegistryShape::Unified => library.runtime_transports(),
            RegistryShape::Legacy => LEGACY_TRANSPORTS
                .iter()
                .map(|name| (name.to_string(), library.transport_class(name)))
                .collect(),
        };

        let registry = Self::from_entries(shape, entries);
        debug!(
            ?shape,
            transports = ?registry.names().collect::<Vec<_>>(),
            "Transport registry built"
        );
        registry
    }

    /// Builds a registry from raw `(name, slot)` entries.
    ///
    /// Entries without a slot are skipped; a repeated name keeps the first.
    #[must_use]
    pub fn from_entries(
        shape: RegistryShape,
        entries: impl IntoIterator<Item = (String, Option<SupportSlot>)>,
    ) -> Self {
        let mut registry = Self {
            shape,
            descriptors: Vec::new(),
            index: FxHashMap::default(),
        };

        for (name, slot) in entries {
            let Some(slot) = slot else {
                trace!(transport = %name, "Transport absent from this build, skipped");
                continue;
            };

            if registry.index.contains_key(&name) {
                warn!(transport = %name, "Duplicate transport entry ignored");
                continue;
            }

            registry
                .index
                .insert(name.clone(), registry.descriptors.len());
            registry
                .descriptors
                .push(TransportDescriptor::wrap(name, slot));
        }

        registry
    }

    /// Shape the registry was built from.
    #[inline]
    #[must_use]
    pub fn shape(&self) -> RegistryShape {
        self.shape
    }

    /// Looks up a descriptor by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TransportDescriptor> {
        self.index.get(name).map(|&i| &self.descriptors[i])
    }

    /// Iterates descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &TransportDescriptor> {
        self.descriptors.iter()
    }

    /// Iterates transport names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.iter().map(TransportDescriptor::name)
    }

    /// Names of transports whose active predicate passes.
    #[must_use]
    pub fn supported(&self, environment: &Environment) -> Vec<&str> {
        self.iter()
            .filter(|d| d.is_supported(environment))
            .map(TransportDescriptor::name)
            .collect()
    }

    /// Restores every descriptor's original predicate.
    pub fn restore_all(&self) {
        self.descriptors.iter().for_each(TransportDescriptor::restore);
    }

    /// Number of descriptors.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns `true` if no transport resolved.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::library::simulated::SimulatedLibrary;
    use crate::version::Version;

    #[test]
    fn test_unified_path_for_3_2_0() {
        let library = SimulatedLibrary::new(Version::new(3, 2, 0))
            .with_runtime_transport("ws", |_| true)
            .with_runtime_transport("xhr_streaming", |_| true)
            .with_runtime_transport("custom", |_| true);

        let registry = TransportRegistry::build(RegistryShape::Unified, &library);

        assert_eq!(registry.shape(), RegistryShape::Unified);
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["ws", "xhr_streaming", "custom"]
        );
        assert_eq!(library.runtime_table_reads(), 1);
        assert_eq!(library.transport_class_lookups(), 0);
    }

    #[test]
    fn test_legacy_path_skips_absent_classes() {
        let library = SimulatedLibrary::new(Version::new(3, 0, 0))
            .with_transport_class("ws", |_| true)
            .with_transport_class("sockjs", |_| true)
            .with_transport_class("xhr_polling", |_| true)
            .with_runtime_transport("never_read", |_| true);

        let registry = TransportRegistry::build(RegistryShape::Legacy, &library);

        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["ws", "sockjs", "xhr_polling"]
        );
        assert!(registry.get("flash").is_none());
        assert!(registry.get("never_read").is_none());
        assert_eq!(library.transport_class_lookups(), LEGACY_TRANSPORTS.len());
        assert_eq!(library.runtime_table_reads(), 0);
    }

    #[test]
    fn test_from_entries_skips_null_and_duplicates() {
        let registry = TransportRegistry::from_entries(
            RegistryShape::Unified,
            vec![
                ("ws".to_string(), Some(SupportSlot::from_fn(|_| true))),
                ("flash".to_string(), None),
                ("ws".to_string(), Some(SupportSlot::from_fn(|_| false))),
            ],
        );

        assert_eq!(registry.len(), 1);
        assert!(registry.get("ws").expect("ws").native_support(&Environment::default()));
    }

    #[test]
    fn test_descriptor_wraps_native_predicate_unchanged() {
        let slot = SupportSlot::from_fn(|env| env.encrypted);
        let descriptor = TransportDescriptor::wrap("ws", slot.clone());

        assert!(descriptor.is_original());
        assert!(descriptor.is_supported(&Environment::new(true)));
        assert!(!descriptor.is_supported(&Environment::new(false)));
        assert!(descriptor.slot().same_slot(&slot));
    }

    #[test]
    fn test_disable_and_restore_round_trip() {
        let descriptor = TransportDescriptor::wrap("ws", SupportSlot::from_fn(|_| true));
        let env = Environment::default();

        descriptor.disable();
        assert!(!descriptor.is_supported(&env));
        assert!(descriptor.native_support(&env));

        descriptor.restore();
        assert!(descriptor.is_supported(&env));
        assert!(descriptor.is_original());
    }

    #[test]
    fn test_supported_and_restore_all() {
        let registry = TransportRegistry::from_entries(
            RegistryShape::Legacy,
            vec![
                ("ws".to_string(), Some(SupportSlot::from_fn(|_| true))),
                ("xhr_polling".to_string(), Some(SupportSlot::from_fn(|_| true))),
                ("flash".to_string(), Some(SupportSlot::from_fn(|_| false))),
            ],
        );
        let env = Environment::default();

        registry.get("ws").expect("ws").disable();
        assert_eq!(registry.supported(&env), vec!["xhr_polling"]);

        registry.restore_all();
        assert_eq!(registry.supported(&env), vec!["ws", "xhr_polling"]);
    }
}
