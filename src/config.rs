//! Session configuration.
//!
//! The host page hands the session a small JSON object:
//!
//! ```json
//! {
//!   "version": "2.1.6",
//!   "key": "app-key",
//!   "name": "staging",
//!   "encrypted": true,
//!   "enabledTransports": ["ws", "sockjs"],
//!   "enabledLogCategories": { "debug": false }
//! }
//! ```
//!
//! | Field | Form | Default |
//! |-------|------|---------|
//! | `version` | `"M.m.p"` or `[M, m, p]` | library's own version string |
//! | `key` | string | required |
//! | `name` | string | `""` |
//! | `encrypted` | bool | `false` |
//! | `enabledTransports` | list of names or `{name: bool}` | none enabled |
//! | `enabledLogCategories` | `{category: bool}` | all visible |
//!
//! # Example
//!
//! ```
//! use pusher_compat::SessionConfig;
//!
//! let config = SessionConfig::new("app-key")
//!     .with_name("staging")
//!     .with_encrypted(true)
//!     .with_transports(["ws", "sockjs"]);
//!
//! assert!(config.validate().is_ok());
//! assert!(config.enabled_transports.contains("ws"));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::result::Result as StdResult;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::library::RealtimeLibrary;
use crate::log::{CategoryVisibility, LogCategory};
use crate::transport::Environment;
use crate::version::Version;

// ============================================================================
// SessionConfig
// ============================================================================

/// Everything a session needs besides its collaborators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Library version; detected from the library when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,

    /// Application key.
    pub key: String,

    /// Environment name, used as cluster and auth `env` parameter.
    #[serde(default)]
    pub name: String,

    /// Whether the page runs over an encrypted connection.
    #[serde(default)]
    pub encrypted: bool,

    /// Transports initially enabled.
    #[serde(default, deserialize_with = "deserialize_transports")]
    pub enabled_transports: FxHashSet<String>,

    /// Initial log visibility; absent categories are visible.
    #[serde(default)]
    pub enabled_log_categories: FxHashMap<LogCategory, bool>,
}

// ============================================================================
// Constructors
// ============================================================================

impl SessionConfig {
    /// Creates a configuration with `key` and defaults elsewhere.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    /// Parses a JSON configuration and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] on malformed input (including unknown log
    /// categories and bad versions) and [`Error::Config`] if validation fails.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, otherwise as
    /// [`from_json`](Self::from_json).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading session configuration");
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl SessionConfig {
    /// Pins the library version instead of detecting it.
    #[inline]
    #[must_use]
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    /// Sets the environment name.
    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets whether the page is encrypted.
    #[inline]
    #[must_use]
    pub fn with_encrypted(mut self, encrypted: bool) -> Self {
        self.encrypted = encrypted;
        self
    }

    /// Enables one transport.
    #[inline]
    #[must_use]
    pub fn with_transport(mut self, name: impl Into<String>) -> Self {
        self.enabled_transports.insert(name.into());
        self
    }

    /// Enables several transports.
    #[inline]
    #[must_use]
    pub fn with_transports(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.enabled_transports
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Sets the initial visibility of one log category.
    #[inline]
    #[must_use]
    pub fn with_log_category(mut self, category: LogCategory, visible: bool) -> Self {
        self.enabled_log_categories.insert(category, visible);
        self
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl SessionConfig {
    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the key is empty.
    pub fn validate(&self) -> Result<()> {
        if self.key.trim().is_empty() {
            return Err(Error::config("key must not be empty"));
        }
        if self.name.is_empty() {
            warn!("Session configured without an environment name");
        }
        Ok(())
    }

    /// Configured version, or the library's self-reported one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidVersion`] if the library reports a malformed
    /// version string.
    pub fn resolve_version(&self, library: &dyn RealtimeLibrary) -> Result<Version> {
        match self.version {
            Some(version) => Ok(version),
            None => {
                let reported = library.version();
                debug!(%reported, "Version detected from library");
                reported.parse()
            }
        }
    }

    /// Environment the transport predicates are evaluated against.
    #[inline]
    #[must_use]
    pub fn environment(&self) -> Environment {
        Environment::new(self.encrypted)
    }

    /// Initial log visibility.
    #[inline]
    #[must_use]
    pub fn visibility(&self) -> CategoryVisibility {
        CategoryVisibility::from_config(&self.enabled_log_categories)
    }
}

// ============================================================================
// Serde Helpers
// ============================================================================

/// `enabledTransports` as a list or a `{name: bool}` map.
#[derive(Deserialize)]
#[serde(untagged)]
enum TransportSelection {
    List(Vec<String>),
    Map(BTreeMap<String, bool>),
}

fn deserialize_transports<'de, D>(deserializer: D) -> StdResult<FxHashSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let names = match TransportSelection::deserialize(deserializer)? {
        TransportSelection::List(names) => names.into_iter().collect(),
        TransportSelection::Map(flags) => flags
            .into_iter()
            .filter_map(|(name, enabled)| enabled.then_some(name))
            .collect(),
    };
    Ok(names)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use crate::library::SimulatedLibrary;

    #[test]
    fn test_parse_list_form() {
        let config = SessionConfig::from_json(
            r#"{"version":"1.12.2","key":"k","name":"dev","encrypted":true,
                "enabledTransports":["ws","flash"]}"#,
        )
        .expect("parse");

        assert_eq!(config.version, Some(Version::new(1, 12, 2)));
        assert!(config.encrypted);
        assert_eq!(config.enabled_transports.len(), 2);
        assert!(config.enabled_transports.contains("flash"));
    }

    #[test]
    fn test_parse_map_form_and_array_version() {
        let config = SessionConfig::from_json(
            r#"{"version":[3,1,0],"key":"k",
                "enabledTransports":{"ws":true,"sockjs":false,"xhr_polling":true}}"#,
        )
        .expect("parse");

        assert_eq!(config.version, Some(Version::new(3, 1, 0)));
        assert!(config.enabled_transports.contains("xhr_polling"));
        assert!(!config.enabled_transports.contains("sockjs"));
    }

    #[test]
    fn test_defaults() {
        let config = SessionConfig::from_json(r#"{"key":"k"}"#).expect("parse");

        assert!(config.version.is_none());
        assert!(!config.encrypted);
        assert!(config.enabled_transports.is_empty());
        assert_eq!(config.visibility(), CategoryVisibility::all_visible());
    }

    #[test]
    fn test_log_categories() {
        let config = SessionConfig::from_json(
            r#"{"key":"k","enabledLogCategories":{"debug":false,"status":true}}"#,
        )
        .expect("parse");

        let visibility = config.visibility();
        assert!(!visibility.get(LogCategory::Debug));
        assert!(visibility.get(LogCategory::Status));
        assert!(visibility.get(LogCategory::Error));
    }

    #[test]
    fn test_unknown_log_category_rejected() {
        let err = SessionConfig::from_json(r#"{"key":"k","enabledLogCategories":{"trace":true}}"#)
            .expect_err("unknown category");
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_empty_key_rejected() {
        let err = SessionConfig::from_json(r#"{"key":"  "}"#).expect_err("empty key");
        assert!(err.is_config_error());
    }

    #[test]
    fn test_bad_version_rejected() {
        assert!(SessionConfig::from_json(r#"{"key":"k","version":"one.two"}"#).is_err());
    }

    #[test]
    fn test_resolve_version_from_library() {
        let library = SimulatedLibrary::new(Version::new(2, 2, 0));

        let detected = SessionConfig::new("k").resolve_version(&library).expect("version");
        assert_eq!(detected, Version::new(2, 2, 0));

        let pinned = SessionConfig::new("k")
            .with_version(Version::new(1, 3, 0))
            .resolve_version(&library)
            .expect("version");
        assert_eq!(pinned, Version::new(1, 3, 0));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"key":"k","name":"file"}}"#).expect("write");

        let config = SessionConfig::from_file(file.path()).expect("load");
        assert_eq!(config.name, "file");

        let missing = SessionConfig::from_file(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(Error::Io(_))));
    }

    #[test]
    fn test_builder() {
        let config = SessionConfig::new("k")
            .with_name("n")
            .with_transport("ws")
            .with_log_category(LogCategory::Message, false);

        assert!(config.enabled_transports.contains("ws"));
        assert!(!config.visibility().get(LogCategory::Message));
        assert_eq!(config.environment(), Environment::new(false));
    }
}
