//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Route registered → TargetPool built from configured base URLs
//!     → next_target() scans from the cursor in round-robin order
//!     → dead targets (per health checker) are skipped
//!     → Return selected target; cursor moves just past it
//! ```
//!
//! # Design Decisions
//! - One pool per route, created at registration and shared via Arc
//! - Liveness is written only by the health checker, read by every request
//! - Selection never fails: with every target dead, index 0 is returned and
//!   the forwarding step reports the error

pub mod pool;
pub mod target;

pub use pool::TargetPool;
pub use target::Target;
