//! Version triples and the three-way comparator.
//!
//! Versions are plain `(major, minor, patch)` integer triples. There is no
//! pre-release or build metadata; comparison is strictly componentwise.
//!
//! # Example
//!
//! ```
//! use pusher_compat::version::{Version, compare};
//!
//! let detected: Version = "1.4.5".parse().unwrap();
//! assert_eq!(compare(&detected, &Version::new(1, 5, 0)), -1);
//! assert!(detected.at_least(Version::new(1, 4, 0)));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::cmp::Ordering;
use std::fmt;
use std::result::Result as StdResult;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

// ============================================================================
// Version
// ============================================================================

/// An immutable `(major, minor, patch)` triple.
///
/// The derived ordering compares fields in declaration order, which is
/// exactly the componentwise precedence of [`compare`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Version {
    /// Major component.
    pub major: u32,
    /// Minor component.
    pub minor: u32,
    /// Patch component.
    pub patch: u32,
}

impl Version {
    /// Creates a version from its components.
    #[inline]
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Returns the components as an array.
    #[inline]
    #[must_use]
    pub const fn to_array(self) -> [u32; 3] {
        [self.major, self.minor, self.patch]
    }

    /// Returns `true` if `compare(self, threshold) >= 0`.
    #[inline]
    #[must_use]
    pub fn at_least(self, threshold: Version) -> bool {
        compare(&self, &threshold) >= 0
    }

    /// Returns `true` if `compare(self, threshold) < 0`.
    #[inline]
    #[must_use]
    pub fn below(self, threshold: Version) -> bool {
        compare(&self, &threshold) < 0
    }
}

// ============================================================================
// Comparator
// ============================================================================

/// Three-way comparison returning `-1`, `0` or `1`.
///
/// Components are compared in order major, minor, patch; the first
/// mismatch decides.
#[must_use]
pub fn compare(a: &Version, b: &Version) -> i8 {
    for (x, y) in a.to_array().into_iter().zip(b.to_array()) {
        if x < y {
            return -1;
        }
        if x > y {
            return 1;
        }
    }
    0
}

/// [`compare`] expressed as an [`Ordering`].
#[inline]
#[must_use]
pub fn ordering(a: &Version, b: &Version) -> Ordering {
    compare(a, b).cmp(&0)
}

// ============================================================================
// Parsing
// ============================================================================

impl FromStr for Version {
    type Err = Error;

    /// Parses `major[.minor[.patch]]`; missing components default to 0.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
        if trimmed.is_empty() {
            return Err(Error::invalid_version(s));
        }

        let mut parts = [0u32; 3];
        for (index, part) in trimmed.split('.').enumerate() {
            if index >= parts.len() {
                return Err(Error::invalid_version(s));
            }
            parts[index] = part.parse().map_err(|_| Error::invalid_version(s))?;
        }

        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}

impl From<[u32; 3]> for Version {
    #[inline]
    fn from(value: [u32; 3]) -> Self {
        Self::new(value[0], value[1], value[2])
    }
}

impl From<(u32, u32, u32)> for Version {
    #[inline]
    fn from((major, minor, patch): (u32, u32, u32)) -> Self {
        Self::new(major, minor, patch)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

// ============================================================================
// Serde
// ============================================================================

/// Accepted wire forms: `"1.4.5"` or `[1, 4, 5]`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawVersion {
    Text(String),
    Triple([u32; 3]),
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> StdResult<Self, D::Error> {
        match RawVersion::deserialize(deserializer)? {
            RawVersion::Text(text) => text.parse().map_err(serde::de::Error::custom),
            RawVersion::Triple(triple) => Ok(triple.into()),
        }
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> StdResult<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// Tests
// ============================================================================
