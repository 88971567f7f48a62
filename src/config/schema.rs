//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Route definitions mapping path prefixes to target pools.
    pub routes: Vec<RouteConfig>,

    /// Health check settings.
    pub health_check: HealthCheckConfig,

    /// Upstream forwarding settings.
    pub upstream: UpstreamConfig,

    /// Internal-service credential injected on every outbound call.
    pub internal_auth: InternalAuthConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Route configuration mapping a path prefix to an ordered target list.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging/metrics.
    pub name: String,

    /// Entry path prefix; every method and any suffix under it is proxied.
    pub path_prefix: String,

    /// Ordered backend base URLs (scheme, host, optional path prefix).
    pub targets: Vec<String>,
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Enable the recurring health checker.
    pub enabled: bool,

    /// Health check interval in seconds.
    pub interval_secs: u64,

    /// Per-probe timeout in seconds.
    pub timeout_secs: u64,

    /// Path probed on each target base URL.
    pub path: String,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 10,
            timeout_secs: 2,
            path: "/health".to_string(),
        }
    }
}

/// Upstream forwarding configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Outbound HTTP request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Outbound WebSocket handshake timeout in seconds.
    pub ws_handshake_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            ws_handshake_timeout_secs: 10,
        }
    }
}

/// Internal-service credential configuration.
///
/// The token value is opaque to the gateway and supplied externally.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InternalAuthConfig {
    /// Header name the credential is sent under.
    pub header: String,

    /// Credential value.
    pub token: String,
}

impl Default for InternalAuthConfig {
    fn default() -> Self {
        Self {
            header: "x-internal-token".to_string(),
            token: String::new(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log filter when RUST_LOG is not set.
    pub log_level: String,

    /// Enable the Prometheus metrics exporter.
    pub metrics_enabled: bool,

    /// Metrics exporter bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert!(config.routes.is_empty());
        assert!(config.health_check.enabled);
        assert_eq!(config.health_check.path, "/health");
        assert_eq!(config.upstream.ws_handshake_timeout_secs, 10);
        assert_eq!(config.internal_auth.header, "x-internal-token");
    }

    #[test]
    fn test_parse_minimal_toml() {
        let raw = r#"
            [listener]
            bind_address = "127.0.0.1:8088"

            [[routes]]
            name = "core"
            path_prefix = "/gateway"
            targets = ["http://127.0.0.1:9001/api", "http://127.0.0.1:9002/api"]

            [internal_auth]
            token = "secret"
        "#;
        let config: GatewayConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:8088");
        assert_eq!(config.routes.len(), 1);
        assert_eq!(config.routes[0].targets.len(), 2);
        assert_eq!(config.internal_auth.token, "secret");
        // Unspecified sections fall back to defaults.
        assert_eq!(config.health_check.interval_secs, 10);
        assert_eq!(config.upstream.request_timeout_secs, 30);
    }
}
