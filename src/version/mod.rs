//! Version comparison and version-keyed dispatch.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Version`] | `(major, minor, patch)` triple |
//! | [`compare`] | Three-way comparator returning `-1`, `0`, `1` |
//! | [`VersionTable`] | Ordered `(minimum → value)` dispatch table |
//! | [`CompatibilityPlan`] | Every version-dependent decision for a session |

// ============================================================================
// Submodules
// ============================================================================

/// Per-session compatibility plan and version thresholds.
pub mod plan;

/// Version-keyed dispatch tables.
pub mod table;

/// Version triples and comparator.
pub mod triple;

// ============================================================================
// Re-exports
// ============================================================================

pub use plan::CompatibilityPlan;
pub use table::VersionTable;
pub use triple::{Version, compare, ordering};
