//! Per-session compatibility plan.
//!
//! Every version-dependent decision is resolved here exactly once, when a
//! session starts. Components receive the plan and never look at the raw
//! version again.
//!
//! | Threshold | Decision |
//! |-----------|----------|
//! | `3.1.0` | Transports come from the unified runtime table |
//! | `2.0.0` | Session id is logged after open |
//! | `1.9.0` | Status tracked via nested `state_change` binding |
//! | `1.5.0` | Modern profile (when encrypted); flash fallback below |
//! | `1.4.0` | Mid profile |

// ============================================================================
// Imports
// ============================================================================

use tracing::debug;

use crate::connection::{ConnectionProfile, StatusBinding};
use crate::transport::{Environment, RegistryShape};

use super::table::VersionTable;
use super::triple::Version;

// ============================================================================
// Thresholds
// ============================================================================

/// First version exposing the unified runtime transport table.
pub const UNIFIED_TRANSPORTS: Version = Version::new(3, 1, 0);

/// First version reporting a session id.
pub const SESSION_ID_LOGGING: Version = Version::new(2, 0, 0);

/// First version with a nested connection handle emitting `state_change`.
pub const STATE_CHANGE_BINDING: Version = Version::new(1, 9, 0);

/// First version of the modern multi-channel profile.
pub const MODERN_PROFILE: Version = Version::new(1, 5, 0);

/// Versions below this need the flash socket shim redirected.
pub const FLASH_FALLBACK_CUTOFF: Version = Version::new(1, 5, 0);

/// First version of the options-object constructor.
pub const MID_PROFILE: Version = Version::new(1, 4, 0);

// ============================================================================
// CompatibilityPlan
// ============================================================================

/// All version-dependent decisions for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompatibilityPlan {
    /// Detected library version.
    pub version: Version,
    /// Where transport descriptors come from.
    pub registry_shape: RegistryShape,
    /// Connection and subscription protocol.
    pub profile: ConnectionProfile,
    /// How connection status is tracked.
    pub status_binding: StatusBinding,
    /// Whether a `session id` debug entry follows open.
    pub logs_session_id: bool,
    /// Whether the flash socket shim must be redirected before connecting.
    pub flash_fallback: bool,
}

impl CompatibilityPlan {
    /// Resolves the plan for a detected version and environment.
    #[must_use]
    pub fn resolve(version: Version, environment: Environment) -> Self {
        let registry_shape = *VersionTable::new(RegistryShape::Legacy)
            .with_entry(UNIFIED_TRANSPORTS, RegistryShape::Unified)
            .select(version);

        let profile = match *profile_table().select(version) {
            ConnectionProfile::Modern if !environment.encrypted => ConnectionProfile::Mid,
            profile => profile,
        };

        let status_binding = *VersionTable::new(StatusBinding::LegacyEvents)
            .with_entry(STATE_CHANGE_BINDING, StatusBinding::StateChange)
            .select(version);

        let plan = Self {
            version,
            registry_shape,
            profile,
            status_binding,
            logs_session_id: version.at_least(SESSION_ID_LOGGING),
            flash_fallback: version.below(FLASH_FALLBACK_CUTOFF),
        };

        debug!(
            %version,
            encrypted = environment.encrypted,
            registry = ?plan.registry_shape,
            profile = ?plan.profile,
            status = ?plan.status_binding,
            session_id = plan.logs_session_id,
            flash_fallback = plan.flash_fallback,
            "Compatibility plan resolved"
        );

        plan
    }
}

/// Channel-subscription protocol by minimum version.
fn profile_table() -> VersionTable<ConnectionProfile> {
    VersionTable::new(ConnectionProfile::Legacy)
        .with_entry(MID_PROFILE, ConnectionProfile::Mid)
        .with_entry(MODERN_PROFILE, ConnectionProfile::Modern)
}

// ============================================================================
// Tests
// ============================================================================
