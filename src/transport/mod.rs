//! Transport capability registry and runtime overrides.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SupportSlot`] | Swappable predicate cell shared with the library |
//! | [`TransportDescriptor`] | Name + native predicate + live slot |
//! | [`TransportRegistry`] | `name → descriptor` for the detected version |
//! | [`TransportOverrideController`] | Toggle-driven support overrides |

// ============================================================================
// Submodules
// ============================================================================

/// Toggle-driven support overrides.
pub mod overrides;

/// Support predicates and slots.
pub mod predicate;

/// Version-shaped transport registry.
pub mod registry;

// ============================================================================
// Re-exports
// ============================================================================

pub use overrides::{TransportOverrideController, TransportOverrides};
pub use predicate::{Environment, SupportPredicate, SupportSlot, never_supported, predicate};
pub use registry::{LEGACY_TRANSPORTS, RegistryShape, TransportDescriptor, TransportRegistry};
