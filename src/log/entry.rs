//! Log categories, entries and per-category visibility.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// LogCategory
// ============================================================================

/// The four fixed log categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogCategory {
    /// Connection status changes.
    Status,
    /// Channel messages.
    Message,
    /// Library and session diagnostics.
    Debug,
    /// Library-reported connection errors.
    Error,
}

impl LogCategory {
    /// Every category, in display order.
    pub const ALL: [LogCategory; 4] = [Self::Status, Self::Message, Self::Debug, Self::Error];

    /// Lowercase category name.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Message => "message",
            Self::Debug => "debug",
            Self::Error => "error",
        }
    }

    /// Position in [`LogCategory::ALL`].
    #[inline]
    #[must_use]
    const fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for LogCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "status" => Ok(Self::Status),
            "message" => Ok(Self::Message),
            "debug" => Ok(Self::Debug),
            "error" => Ok(Self::Error),
            other => Err(Error::unknown_category(other)),
        }
    }
}

impl fmt::Display for LogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// LogEntry
// ============================================================================

/// One appended log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Category the entry was logged under.
    pub category: LogCategory,
    /// Formatted text.
    pub payload: String,
    /// Append time.
    pub timestamp: SystemTime,
}

impl LogEntry {
    /// Creates an entry stamped with the current time.
    #[inline]
    #[must_use]
    pub fn now(category: LogCategory, payload: impl Into<String>) -> Self {
        Self {
            category,
            payload: payload.into(),
            timestamp: SystemTime::now(),
        }
    }
}

// ============================================================================
// CategoryVisibility
// ============================================================================

/// Display flag per category. Every category starts visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryVisibility {
    flags: [bool; 4],
}

impl CategoryVisibility {
    /// All categories visible.
    #[inline]
    #[must_use]
    pub const fn all_visible() -> Self {
        Self { flags: [true; 4] }
    }

    /// Builds visibility from configuration; absent keys are visible.
    #[must_use]
    pub fn from_config(config: &FxHashMap<LogCategory, bool>) -> Self {
        let mut visibility = Self::all_visible();
        for (&category, &visible) in config {
            visibility.set(category, visible);
        }
        visibility
    }

    /// Whether `category` is displayed.
    #[inline]
    #[must_use]
    pub const fn get(&self, category: LogCategory) -> bool {
        self.flags[category.index()]
    }

    /// Sets whether `category` is displayed.
    #[inline]
    pub fn set(&mut self, category: LogCategory, visible: bool) {
        self.flags[category.index()] = visible;
    }
}

impl Default for CategoryVisibility {
    fn default() -> Self {
        Self::all_visible()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_categories() {
        for category in LogCategory::ALL {
            assert_eq!(category.as_str().parse::<LogCategory>().expect("parse"), category);
        }
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "warning".parse::<LogCategory>().unwrap_err();
        assert!(err.is_contract_violation());

        // case-sensitive
        assert!("Status".parse::<LogCategory>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&LogCategory::Message).expect("serialize");
        assert_eq!(json, "\"message\"");
        assert!(serde_json::from_str::<LogCategory>("\"verbose\"").is_err());
    }

    #[test]
    fn test_visibility_defaults_to_visible() {
        let mut config = FxHashMap::default();
        config.insert(LogCategory::Debug, false);

        let visibility = CategoryVisibility::from_config(&config);
        assert!(visibility.get(LogCategory::Status));
        assert!(visibility.get(LogCategory::Message));
        assert!(!visibility.get(LogCategory::Debug));
        assert!(visibility.get(LogCategory::Error));
    }
}
