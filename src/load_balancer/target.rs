//! Backend target abstraction.
//!
//! # Responsibilities
//! - Represent a single backend instance as a parsed base URL
//! - Expose the pieces the forwarders need: scheme, authority, path prefix
//! - Map the HTTP scheme to its WebSocket counterpart

use std::fmt;

use url::Url;

use crate::error::GatewayError;

/// One backend instance reachable at a base URL.
///
/// Immutable once parsed; owned by the [`TargetPool`](super::pool::TargetPool)
/// for the lifetime of the route.
#[derive(Debug, Clone)]
pub struct Target {
    base: Url,
    /// Pre-rendered `host[:port]` for URI construction.
    authority: String,
}

impl Target {
    /// Parse a configured base URL into a target.
    ///
    /// Accepts `http`, `https`, `ws` and `wss` schemes; anything else is a
    /// registration-time error.
    pub fn parse(raw: &str) -> Result<Self, GatewayError> {
        let base = Url::parse(raw).map_err(|source| GatewayError::InvalidTargetUrl {
            url: raw.to_string(),
            source,
        })?;

        if !matches!(base.scheme(), "http" | "https" | "ws" | "wss") {
            return Err(GatewayError::UnsupportedScheme {
                url: raw.to_string(),
                scheme: base.scheme().to_string(),
            });
        }

        let host = base
            .host_str()
            .ok_or_else(|| GatewayError::MissingHost {
                url: raw.to_string(),
            })?;
        let authority = match base.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        Ok(Self { base, authority })
    }

    /// `host[:port]` of the backend.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Path prefix of the base URL (always starts with `/`).
    pub fn prefix(&self) -> &str {
        self.base.path()
    }

    /// Scheme for plain HTTP forwarding (`ws`/`wss` normalize back to
    /// `http`/`https`).
    pub fn http_scheme(&self) -> &str {
        match self.base.scheme() {
            "ws" => "http",
            "wss" => "https",
            other => other,
        }
    }

    /// Scheme for upstream WebSocket handshakes (`http` -> `ws`,
    /// `https` -> `wss`, `ws`/`wss` pass through).
    pub fn ws_scheme(&self) -> &str {
        match self.base.scheme() {
            "http" => "ws",
            "https" => "wss",
            other => other,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.base.fmt(f)
    }
}
