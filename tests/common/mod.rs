//! Shared helpers for integration tests: mock HTTP backends, a mock
//! WebSocket upstream, and a gateway instance, all on ephemeral ports.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use api_gateway::config::{GatewayConfig, RouteConfig};
use api_gateway::lifecycle::Shutdown;
use api_gateway::GatewayServer;

/// Internal-service credential used by every test gateway.
pub const INTERNAL_TOKEN: &str = "test-internal-token";

/// One mock backend: echoes request details as JSON, with a togglable
/// health endpoint.
pub struct MockBackend {
    pub addr: SocketAddr,
    pub healthy: Arc<AtomicBool>,
}

#[derive(Clone)]
struct BackendState {
    name: &'static str,
    healthy: Arc<AtomicBool>,
}

/// Start a mock backend on an ephemeral port.
///
/// `/health` answers 200 while the `healthy` flag is set and 503 otherwise;
/// every other path echoes the received path, query, headers and body.
pub async fn start_backend(name: &'static str) -> MockBackend {
    let healthy = Arc::new(AtomicBool::new(true));
    let state = BackendState {
        name,
        healthy: healthy.clone(),
    };

    let app = Router::new()
        .route("/health", get(health))
        .fallback(echo)
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockBackend { addr, healthy }
}

async fn health(State(state): State<BackendState>) -> StatusCode {
    if state.healthy.load(Ordering::SeqCst) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn echo(
    State(state): State<BackendState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Value> {
    let mut header_map = serde_json::Map::new();
    for (name, value) in &headers {
        header_map.insert(
            name.as_str().to_string(),
            Value::String(String::from_utf8_lossy(value.as_bytes()).into_owned()),
        );
    }

    Json(json!({
        "backend": state.name,
        "path": uri.path(),
        "query": uri.query(),
        "headers": header_map,
        "body": String::from_utf8_lossy(&body).into_owned(),
    }))
}

/// Mock WebSocket upstream: records handshake headers, answers text "ping"
/// with text "pong", echoes every other frame.
pub struct MockWsUpstream {
    pub addr: SocketAddr,
    pub handshake_headers: Arc<Mutex<Option<HeaderMap>>>,
}

#[derive(Clone)]
struct WsState {
    handshake_headers: Arc<Mutex<Option<HeaderMap>>>,
}

pub async fn start_ws_upstream() -> MockWsUpstream {
    let handshake_headers = Arc::new(Mutex::new(None));
    let state = WsState {
        handshake_headers: handshake_headers.clone(),
    };

    let app = Router::new().fallback(ws_entry).with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockWsUpstream {
        addr,
        handshake_headers,
    }
}

async fn ws_entry(
    State(state): State<WsState>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    *state.handshake_headers.lock().await = Some(headers);
    ws.on_upgrade(echo_session)
}

async fn echo_session(mut socket: WebSocket) {
    while let Some(Ok(frame)) = socket.recv().await {
        let reply = match frame {
            Message::Text(text) if text.as_str() == "ping" => Message::Text("pong".into()),
            Message::Close(_) => break,
            other => other,
        };
        if socket.send(reply).await.is_err() {
            break;
        }
    }
}

/// Build a single-route gateway config pointing at `targets`.
///
/// Health checking starts disabled; tests that need it flip the flag.
pub fn gateway_config(targets: Vec<String>) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.routes.push(RouteConfig {
        name: "core".into(),
        path_prefix: "/gateway".into(),
        targets,
    });
    config.internal_auth.token = INTERNAL_TOKEN.into();
    config.health_check.enabled = false;
    config
}

/// Register the routes and serve the gateway on an ephemeral port.
pub async fn start_gateway(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = GatewayServer::new(config).unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });
    (addr, shutdown)
}

/// An address nothing is listening on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// A reqwest client that bypasses connection pooling and proxies.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
