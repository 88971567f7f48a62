//! HTTP/WebSocket Reverse-Proxy Gateway
//!
//! Accepts inbound requests and WebSocket upgrades at configured entry
//! routes, selects a healthy backend target round-robin, forwards the
//! request or bridges the connection, and relays the response or frame
//! stream back. A recurring health checker keeps per-target liveness
//! current so traffic never lands on a known-dead instance.

// Core subsystems
pub mod config;
pub mod error;
pub mod http;

// Traffic management
pub mod health;
pub mod load_balancer;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
