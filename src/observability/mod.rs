//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through all log events on the request path
//! - Metric updates are cheap (atomic operations); the exporter is optional
//! - Label cardinality stays bounded: method, status, target only

pub mod logging;
pub mod metrics;
