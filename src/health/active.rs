//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe every target of a pool
//! - Overwrite liveness from each tick's outcome
//!
//! # Design Decisions
//! - A target is alive iff the probe transport succeeds AND the status is
//!   exactly 200; any transport error or timeout counts as dead
//! - No retry within a tick and no hysteresis: liveness carries no memory
//!   of earlier ticks
//! - Probe failures are absorbed here; they never reach the request path

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::sync::broadcast;
use tokio::time;

use crate::config::HealthCheckConfig;
use crate::http::request::single_joining_slash;
use crate::load_balancer::{Target, TargetPool};
use crate::observability::metrics;

/// Recurring background task probing one route's targets.
pub struct HealthChecker {
    route: String,
    pool: Arc<TargetPool>,
    config: HealthCheckConfig,
    client: Client<HttpConnector, Body>,
}

impl HealthChecker {
    pub fn new(route: String, pool: Arc<TargetPool>, config: HealthCheckConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Self {
            route,
            pool,
            config,
            client,
        }
    }

    /// Probe on every tick until the shutdown signal arrives.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            route = %self.route,
            interval = self.config.interval_secs,
            path = %self.config.path,
            "health checker starting"
        );

        let mut ticker = time::interval(Duration::from_secs(self.config.interval_secs));

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check_all().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!(route = %self.route, "health checker stopping");
                    break;
                }
            }
        }
    }

    /// Probe each target in order and overwrite its liveness flag.
    async fn check_all(&self) {
        for index in 0..self.pool.len() {
            let target = self.pool.get(index);
            let alive = self.probe(target).await;

            if alive {
                self.pool.mark_alive(index);
            } else {
                self.pool.mark_dead(index);
            }
            metrics::record_target_health(&target.to_string(), alive);
        }

        tracing::debug!(
            route = %self.route,
            alive = self.pool.alive_count(),
            total = self.pool.len(),
            "health tick complete"
        );
    }

    async fn probe(&self, target: &Target) -> bool {
        let uri = format!(
            "{}://{}{}",
            target.http_scheme(),
            target.authority(),
            single_joining_slash(target.prefix(), &self.config.path)
        );

        let request = match Request::builder()
            .method("GET")
            .uri(uri)
            .header("user-agent", "api-gateway-health-check")
            .body(Body::empty())
        {
            Ok(request) => request,
            Err(e) => {
                tracing::error!(target = %target, error = %e, "failed to build health probe");
                return false;
            }
        };

        let timeout = Duration::from_secs(self.config.timeout_secs);
        match time::timeout(timeout, self.client.request(request)).await {
            Ok(Ok(response)) => {
                let alive = response.status() == StatusCode::OK;
                if !alive {
                    tracing::warn!(
                        target = %target,
                        status = %response.status(),
                        "health probe failed: unexpected status"
                    );
                }
                alive
            }
            Ok(Err(e)) => {
                tracing::warn!(target = %target, error = %e, "health probe failed: connection error");
                false
            }
            Err(_) => {
                tracing::warn!(target = %target, "health probe failed: timeout");
                false
            }
        }
    }
}
