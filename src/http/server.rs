//! Gateway server setup and request dispatch.
//!
//! # Responsibilities
//! - Build the Axum router with one entry route per configured prefix
//! - Wire up middleware (tracing, request ID)
//! - Spawn the per-route health checkers
//! - Classify each inbound request as upgrade vs. plain HTTP
//! - Forward plain requests to the selected target and stream the response

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, HeaderValue, Request, StatusCode},
    response::Response,
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::health::HealthChecker;
use crate::http::request::{self, RequestIdLayer};
use crate::http::{response, websocket};
use crate::lifecycle::Shutdown;
use crate::load_balancer::TargetPool;
use crate::observability::metrics;

/// Internal-service credential, parsed once at registration.
#[derive(Debug)]
pub struct InternalAuth {
    pub header: HeaderName,
    pub value: HeaderValue,
}

/// Per-route state injected into the gateway handler.
///
/// Constructed at route registration and scoped to it; request handlers
/// receive it explicitly instead of reaching for process-wide globals.
#[derive(Clone)]
pub struct RouteState {
    pub route: String,
    pub pool: Arc<TargetPool>,
    pub client: Client<HttpConnector, Body>,
    pub internal_auth: Arc<InternalAuth>,
    pub request_timeout: Duration,
    pub ws_handshake_timeout: Duration,
}

/// HTTP/WebSocket gateway server.
pub struct GatewayServer {
    router: Router,
    pools: Vec<(String, Arc<TargetPool>)>,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Register every configured route.
    ///
    /// Fails if any target URL is malformed or the credential header cannot
    /// be represented; a route never registers with a partial pool.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let header = config
            .internal_auth
            .header
            .parse::<HeaderName>()
            .map_err(|_| GatewayError::InvalidCredentialHeader {
                name: config.internal_auth.header.clone(),
            })?;
        let value = HeaderValue::from_str(&config.internal_auth.token).map_err(|_| {
            GatewayError::InvalidCredentialValue {
                name: config.internal_auth.header.clone(),
            }
        })?;
        let internal_auth = Arc::new(InternalAuth { header, value });

        let mut router = Router::new();
        let mut pools = Vec::new();

        for route in &config.routes {
            if route.targets.is_empty() {
                return Err(GatewayError::EmptyPool {
                    route: route.name.clone(),
                });
            }

            let pool = Arc::new(TargetPool::new(&route.targets)?);
            pools.push((route.name.clone(), pool.clone()));

            let state = RouteState {
                route: route.name.clone(),
                pool,
                client: client.clone(),
                internal_auth: internal_auth.clone(),
                request_timeout: Duration::from_secs(config.upstream.request_timeout_secs),
                ws_handshake_timeout: Duration::from_secs(
                    config.upstream.ws_handshake_timeout_secs,
                ),
            };

            let entry = Router::new()
                .route("/", any(gateway_handler))
                .route("/{*path}", any(gateway_handler))
                .with_state(state);
            router = router.nest(&route.path_prefix, entry);

            tracing::info!(
                route = %route.name,
                path_prefix = %route.path_prefix,
                targets = route.targets.len(),
                "route registered"
            );
        }

        let router = router
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http());

        Ok(Self {
            router,
            pools,
            config,
        })
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "gateway server starting");

        if self.config.health_check.enabled {
            for (route, pool) in &self.pools {
                let checker = HealthChecker::new(
                    route.clone(),
                    pool.clone(),
                    self.config.health_check.clone(),
                );
                let receiver = shutdown.subscribe();
                tokio::spawn(async move {
                    checker.run(receiver).await;
                });
            }
        }

        let mut receiver = shutdown.subscribe();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = receiver.recv().await;
            })
            .await?;

        tracing::info!("gateway server stopped");
        Ok(())
    }
}

/// Entry handler for one route: classify, then bridge or forward.
async fn gateway_handler(State(state): State<RouteState>, request: Request<Body>) -> Response {
    if request::is_upgrade_request(&request) {
        websocket::handle_upgrade(state, request).await
    } else {
        forward_request(state, request).await
    }
}

/// Forward a plain HTTP request to the next target and stream the response
/// back. No retry against another target within the same request.
async fn forward_request(state: RouteState, request: Request<Body>) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let request_id = request
        .headers()
        .get(request::X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let (parts, body) = request.into_parts();

    let target = state.pool.next_target();
    let target_label = target.to_string();
    let uri = match request::build_upstream_uri(target, parts.uri.path(), parts.uri.query()) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                route = %state.route,
                error = %e,
                "failed to build upstream uri"
            );
            return response::bad_gateway();
        }
    };

    tracing::debug!(
        request_id = %request_id,
        route = %state.route,
        method = %method,
        uri = %uri,
        "forwarding request"
    );

    let mut builder = Request::builder()
        .method(parts.method.clone())
        .uri(uri)
        .version(parts.version);
    if let Some(headers) = builder.headers_mut() {
        *headers = request::forward_headers(&parts.headers);
        headers.insert(
            state.internal_auth.header.clone(),
            state.internal_auth.value.clone(),
        );
    }
    let outbound = match builder.body(body) {
        Ok(outbound) => outbound,
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                route = %state.route,
                error = %e,
                "failed to build upstream request"
            );
            return response::bad_gateway();
        }
    };

    match tokio::time::timeout(state.request_timeout, state.client.request(outbound)).await {
        Ok(Ok(upstream_response)) => {
            let status = upstream_response.status();
            metrics::record_request(&method, status.as_u16(), &target_label, started);
            response::from_upstream(upstream_response)
        }
        Ok(Err(e)) => {
            tracing::warn!(
                request_id = %request_id,
                route = %state.route,
                target = %target_label,
                error = %e,
                "upstream request failed"
            );
            metrics::record_request(
                &method,
                StatusCode::BAD_GATEWAY.as_u16(),
                &target_label,
                started,
            );
            response::bad_gateway()
        }
        Err(_) => {
            tracing::warn!(
                request_id = %request_id,
                route = %state.route,
                target = %target_label,
                "upstream request timed out"
            );
            metrics::record_request(
                &method,
                StatusCode::GATEWAY_TIMEOUT.as_u16(),
                &target_label,
                started,
            );
            response::gateway_timeout()
        }
    }
}
