//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Periodic timer (active.rs)
//!     → GET <target-base>/health on every target, in order
//!     → alive ⇔ transport success AND status 200
//!     → overwrite the pool's liveness flags
//! ```
//!
//! # Design Decisions
//! - Each tick fully overwrites liveness from that tick's outcome; no
//!   thresholds, no flap damping
//! - Probe failures stay inside this subsystem; the request path only ever
//!   sees the liveness flags

pub mod active;

pub use active::HealthChecker;
