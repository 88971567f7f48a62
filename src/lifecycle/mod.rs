//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Signal received → stop accepting → drain in-flight work → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - One broadcast channel; the accept loop and every health checker
//!   subscribe to it
//! - Config reload on SIGHUP is out of scope; restart the process instead

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
