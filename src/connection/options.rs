//! Client constructor arguments.
//!
//! Legacy clients take the channel name as a positional argument; later
//! clients take an options object.
//!
//! # Example
//!
//! ```
//! use pusher_compat::connection::ClientOptions;
//!
//! let options = ClientOptions::with_auth("staging");
//! let json = serde_json::to_value(&options).unwrap();
//! assert_eq!(json["cluster"], "staging");
//! assert_eq!(json["auth"]["params"]["env"], "staging");
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Serialize;

// ============================================================================
// Constants
// ============================================================================

/// Host of the local encrypted websocket endpoint.
pub const LOCAL_WS_HOST: &str = "127.0.0.1";

/// Port of the local encrypted websocket endpoint.
pub const LOCAL_WS_PORT: u16 = 6002;

/// Transport forced by the modern profile.
pub const FORCED_TRANSPORT: &str = "ws";

// ============================================================================
// ConnectOptions
// ============================================================================

/// Second constructor argument of the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOptions {
    /// Channel name passed positionally (legacy clients).
    Positional {
        /// Channel to join on construction.
        channel: String,
    },
    /// Options object.
    Options(ClientOptions),
}

impl ConnectOptions {
    /// Returns the options object, if any.
    #[inline]
    #[must_use]
    pub fn options(&self) -> Option<&ClientOptions> {
        match self {
            Self::Options(options) => Some(options),
            Self::Positional { .. } => None,
        }
    }

    /// Whether the client is asked to use an encrypted connection.
    #[inline]
    #[must_use]
    pub fn is_encrypted(&self) -> bool {
        self.options()
            .and_then(|o| o.encrypted)
            .unwrap_or_default()
    }
}

// ============================================================================
// ClientOptions
// ============================================================================

/// Options object, serialized with the library's field names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientOptions {
    /// Websocket host override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ws_host: Option<String>,

    /// Websocket port override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ws_port: Option<u16>,

    /// Preferred transport.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport: Option<String>,

    /// Transports the client may use.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enabled_transports: Vec<String>,

    /// Force TLS on the socket.
    #[serde(rename = "forceTLS", skip_serializing_if = "Option::is_none")]
    pub force_tls: Option<bool>,

    /// Request an encrypted connection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encrypted: Option<bool>,

    /// Parameters sent to the channel auth endpoint.
    pub auth: AuthOptions,

    /// Cluster the client connects to.
    pub cluster: String,
}

/// Auth endpoint parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthOptions {
    /// Extra form parameters.
    pub params: BTreeMap<String, String>,
}

impl ClientOptions {
    /// Options carrying auth params and cluster for environment `name`.
    #[must_use]
    pub fn with_auth(name: &str) -> Self {
        let mut params = BTreeMap::new();
        params.insert("env".to_string(), name.to_string());

        Self {
            auth: AuthOptions { params },
            cluster: name.to_string(),
            ..Default::default()
        }
    }

    /// [`with_auth`](Self::with_auth) plus the forced encrypted websocket.
    #[must_use]
    pub fn encrypted_ws(name: &str) -> Self {
        Self {
            ws_host: Some(LOCAL_WS_HOST.to_string()),
            ws_port: Some(LOCAL_WS_PORT),
            transport: Some(FORCED_TRANSPORT.to_string()),
            enabled_transports: vec![FORCED_TRANSPORT.to_string()],
            force_tls: Some(false),
            encrypted: Some(true),
            ..Self::with_auth(name)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_mid_options_serialization() {
        let json = serde_json::to_value(ClientOptions::with_auth("prod")).expect("serialize");
        assert_eq!(
            json,
            json!({ "auth": { "params": { "env": "prod" } }, "cluster": "prod" })
        );
    }

    #[test]
    fn test_encrypted_options_serialization() {
        let json = serde_json::to_value(ClientOptions::encrypted_ws("prod")).expect("serialize");
        assert_eq!(
            json,
            json!({
                "wsHost": "127.0.0.1",
                "wsPort": 6002,
                "transport": "ws",
                "enabledTransports": ["ws"],
                "forceTLS": false,
                "encrypted": true,
                "auth": { "params": { "env": "prod" } },
                "cluster": "prod"
            })
        );
    }

    #[test]
    fn test_is_encrypted() {
        assert!(ConnectOptions::Options(ClientOptions::encrypted_ws("x")).is_encrypted());
        assert!(!ConnectOptions::Options(ClientOptions::with_auth("x")).is_encrypted());
        let positional = ConnectOptions::Positional {
            channel: "presence-channel".into(),
        };
        assert!(!positional.is_encrypted());
        assert!(positional.options().is_none());
    }
}
