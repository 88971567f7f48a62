//! Target pool with round-robin selection.
//!
//! # Responsibilities
//! - Own the ordered targets of one route and their liveness flags
//! - Select the next alive target in round-robin order
//! - Expose liveness updates to the health checker
//!
//! # Design Decisions
//! - Liveness flags and cursor are atomics: the cursor is written by every
//!   request task, liveness by the health checker, and both are read
//!   concurrently. A lost cursor update under a race only costs round-robin
//!   fairness, never consistency.
//! - The raw arrays are never exposed; callers go through
//!   `next_target`/`mark_alive`/`mark_dead`.
//! - When every target is dead, selection still returns index 0. The failure
//!   then surfaces at the forwarding step instead of at selection.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::error::GatewayError;
use crate::load_balancer::target::Target;

/// Ordered backend targets plus index-aligned liveness flags.
///
/// Created once at route registration and shared for as long as the route is
/// registered. Liveness defaults to alive for every target.
#[derive(Debug)]
pub struct TargetPool {
    targets: Vec<Target>,
    liveness: Vec<AtomicBool>,
    cursor: AtomicUsize,
}

impl TargetPool {
    /// Parse the configured base URLs into a pool.
    ///
    /// Any malformed URL fails the whole pool: the route must not register
    /// with a partial target list.
    pub fn new<S: AsRef<str>>(urls: &[S]) -> Result<Self, GatewayError> {
        let targets = urls
            .iter()
            .map(|url| Target::parse(url.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let liveness = targets.iter().map(|_| AtomicBool::new(true)).collect();

        Ok(Self {
            targets,
            liveness,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Number of targets in the pool.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Look up a target by index.
    pub fn get(&self, index: usize) -> &Target {
        &self.targets[index]
    }

    pub fn is_alive(&self, index: usize) -> bool {
        self.liveness[index].load(Ordering::Relaxed)
    }

    pub fn mark_alive(&self, index: usize) {
        self.liveness[index].store(true, Ordering::Relaxed);
    }

    pub fn mark_dead(&self, index: usize) {
        self.liveness[index].store(false, Ordering::Relaxed);
    }

    /// Number of currently alive targets.
    pub fn alive_count(&self) -> usize {
        self.liveness
            .iter()
            .filter(|alive| alive.load(Ordering::Relaxed))
            .count()
    }

    /// Select the next alive target in round-robin order.
    ///
    /// Scans forward from the cursor, returns the first alive target and
    /// moves the cursor just past it. If no target is alive the first target
    /// is returned unconditionally; the caller's forward attempt reports the
    /// failure.
    pub fn next_target(&self) -> &Target {
        let len = self.targets.len();
        let start = self.cursor.load(Ordering::Relaxed);

        for i in 0..len {
            let index = (start + i) % len;
            if self.liveness[index].load(Ordering::Relaxed) {
                self.cursor.store(index + 1, Ordering::Relaxed);
                return &self.targets[index];
            }
        }

        &self.targets[0]
    }
}
