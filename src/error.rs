//! Error types for the compatibility layer.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use pusher_compat::{LogRouter, Result};
//!
//! fn example(router: &LogRouter) -> Result<()> {
//!     router.log("status", "connected")?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::InvalidVersion`] |
//! | Contract | [`Error::UnknownCategory`] |
//! | Library | [`Error::LibraryShape`], [`Error::NoChannel`] |
//! | Session | [`Error::SessionClosed`] |
//! | External | [`Error::Io`], [`Error::Json`] |
//!
//! Connection errors reported by the client library are never surfaced
//! as [`Error`]; they become normalized `error` events instead.

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when the session configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Version string could not be parsed.
    ///
    /// Returned for anything that is not `major[.minor[.patch]]`.
    #[error("Invalid version: {input:?}")]
    InvalidVersion {
        /// The rejected input.
        input: String,
    },

    // ========================================================================
    // Contract Errors
    // ========================================================================
    /// Log category outside `status`, `message`, `debug`, `error`.
    #[error("Unknown log category: {category:?}")]
    UnknownCategory {
        /// The rejected category name.
        category: String,
    },

    // ========================================================================
    // Library Errors
    // ========================================================================
    /// The client library lacks the shape the detected version requires.
    ///
    /// Returned e.g. when a `>= 1.9.0` library exposes no nested
    /// connection handle.
    #[error("Library shape mismatch: {message}")]
    LibraryShape {
        /// Description of the missing piece.
        message: String,
    },

    /// No channel handle is available for a channel operation.
    ///
    /// Legacy clients bind on the root handle and never hand out channels.
    #[error("No channel subscribed")]
    NoChannel,

    // ========================================================================
    // Session Errors
    // ========================================================================
    /// The session command loop has terminated.
    #[error("Session closed")]
    SessionClosed,

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid version error.
    #[inline]
    pub fn invalid_version(input: impl Into<String>) -> Self {
        Self::InvalidVersion {
            input: input.into(),
        }
    }

    /// Creates an unknown category error.
    #[inline]
    pub fn unknown_category(category: impl Into<String>) -> Self {
        Self::UnknownCategory {
            category: category.into(),
        }
    }

    /// Creates a library shape error.
    #[inline]
    pub fn library_shape(message: impl Into<String>) -> Self {
        Self::LibraryShape {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a configuration error.
    #[inline]
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::Config { .. } | Self::InvalidVersion { .. } | Self::Json(_) | Self::Io(_)
        )
    }

    /// Returns `true` if this is a programmer contract violation.
    #[inline]
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::UnknownCategory { .. })
    }

    /// Returns `true` if the client library did not match the expected shape.
    #[inline]
    #[must_use]
    pub fn is_library_error(&self) -> bool {
        matches!(self, Self::LibraryShape { .. } | Self::NoChannel)
    }
}

// ============================================================================
// Tests
// ============================================================================
