//! WebSocket bridging.
//!
//! # Responsibilities
//! - Complete the upgrade handshake with the client
//! - Open the matching upstream WebSocket connection
//! - Relay frames in both directions until either side fails
//!
//! # Data Flow
//! ```text
//! Client ←── WebSocket frames ──→ Gateway ←── WebSocket frames ──→ Target
//! ```
//!
//! # Design Decisions
//! - Frame type and payload are copied unmodified in both directions
//! - The session ends on the first relay error (an ordinary close surfaces
//!   as a read ending); the surviving relay task is aborted so both
//!   connections drop together and no upstream connection leaks
//! - Upstream handshake failure closes the downstream socket; the client
//!   never sees a half-established bridge

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::ws::{self, WebSocket, WebSocketUpgrade};
use axum::extract::FromRequestParts;
use axum::http::{header, HeaderValue, Request};
use axum::response::{IntoResponse, Response};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::{self, protocol::CloseFrame};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::http::request::single_joining_slash;
use crate::http::server::{InternalAuth, RouteState};

type UpstreamSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Accept a qualified upgrade request and bridge it to the selected target.
///
/// The target is selected and the upstream URL captured before the client
/// handshake completes, so a pool with no alive targets still follows the
/// index-0 fallback and fails at connect time.
pub async fn handle_upgrade(state: RouteState, request: Request<Body>) -> Response {
    let upstream_url = {
        let target = state.pool.next_target();
        let path = single_joining_slash(target.prefix(), request.uri().path());
        let mut url = format!("{}://{}{}", target.ws_scheme(), target.authority(), path);
        if let Some(query) = request.uri().query() {
            url.push('?');
            url.push_str(query);
        }
        url
    };

    let authorization = request.headers().get(header::AUTHORIZATION).cloned();
    let route = state.route.clone();
    let internal_auth = state.internal_auth.clone();
    let handshake_timeout = state.ws_handshake_timeout;

    let (mut parts, _body) = request.into_parts();
    let upgrade = match WebSocketUpgrade::from_request_parts(&mut parts, &()).await {
        Ok(upgrade) => upgrade,
        Err(rejection) => return rejection.into_response(),
    };

    upgrade.on_upgrade(move |downstream| {
        bridge_session(
            downstream,
            upstream_url,
            authorization,
            internal_auth,
            handshake_timeout,
            route,
        )
    })
}

/// One bridge session: connect upstream, then relay until the first failure.
async fn bridge_session(
    downstream: WebSocket,
    upstream_url: String,
    authorization: Option<HeaderValue>,
    internal_auth: Arc<InternalAuth>,
    handshake_timeout: Duration,
    route: String,
) {
    let mut handshake = match upstream_url.as_str().into_client_request() {
        Ok(handshake) => handshake,
        Err(e) => {
            tracing::warn!(route = %route, url = %upstream_url, error = %e, "failed to build upstream handshake");
            close_downstream(downstream).await;
            return;
        }
    };
    handshake
        .headers_mut()
        .insert(internal_auth.header.clone(), internal_auth.value.clone());
    if let Some(credential) = authorization {
        handshake.headers_mut().insert(header::AUTHORIZATION, credential);
    }

    let upstream = match tokio::time::timeout(handshake_timeout, connect_async(handshake)).await {
        Ok(Ok((upstream, _response))) => upstream,
        Ok(Err(e)) => {
            tracing::warn!(route = %route, url = %upstream_url, error = %e, "upstream websocket handshake failed");
            close_downstream(downstream).await;
            return;
        }
        Err(_) => {
            tracing::warn!(route = %route, url = %upstream_url, "upstream websocket handshake timed out");
            close_downstream(downstream).await;
            return;
        }
    };

    tracing::debug!(route = %route, url = %upstream_url, "bridge established");

    let (upstream_sink, upstream_stream) = upstream.split();
    let (downstream_sink, downstream_stream) = downstream.split();

    let mut downstream_to_upstream =
        tokio::spawn(relay_downstream_to_upstream(downstream_stream, upstream_sink));
    let mut upstream_to_downstream =
        tokio::spawn(relay_upstream_to_downstream(upstream_stream, downstream_sink));

    // Whichever relay finishes first ends the session; aborting the survivor
    // drops the remaining halves and closes both connections.
    tokio::select! {
        _ = &mut downstream_to_upstream => upstream_to_downstream.abort(),
        _ = &mut upstream_to_downstream => downstream_to_upstream.abort(),
    }

    tracing::debug!(route = %route, "bridge session closed");
}

async fn close_downstream(mut downstream: WebSocket) {
    let _ = downstream.send(ws::Message::Close(None)).await;
}

async fn relay_downstream_to_upstream(
    mut downstream: SplitStream<WebSocket>,
    mut upstream: SplitSink<UpstreamSocket, tungstenite::Message>,
) {
    while let Some(frame) = downstream.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!(error = %e, "downstream read ended");
                break;
            }
        };
        if upstream.send(client_frame_to_upstream(frame)).await.is_err() {
            break;
        }
    }
}

async fn relay_upstream_to_downstream(
    mut upstream: SplitStream<UpstreamSocket>,
    mut downstream: SplitSink<WebSocket, ws::Message>,
) {
    while let Some(frame) = upstream.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!(error = %e, "upstream read ended");
                break;
            }
        };
        let Some(frame) = upstream_frame_to_client(frame) else {
            continue;
        };
        if downstream.send(frame).await.is_err() {
            break;
        }
    }
}

fn client_frame_to_upstream(frame: ws::Message) -> tungstenite::Message {
    match frame {
        ws::Message::Text(text) => tungstenite::Message::Text(text.as_str().into()),
        ws::Message::Binary(data) => tungstenite::Message::Binary(data),
        ws::Message::Ping(data) => tungstenite::Message::Ping(data),
        ws::Message::Pong(data) => tungstenite::Message::Pong(data),
        ws::Message::Close(frame) => tungstenite::Message::Close(frame.map(|f| CloseFrame {
            code: f.code.into(),
            reason: f.reason.as_str().into(),
        })),
    }
}

fn upstream_frame_to_client(frame: tungstenite::Message) -> Option<ws::Message> {
    match frame {
        tungstenite::Message::Text(text) => Some(ws::Message::Text(text.as_str().into())),
        tungstenite::Message::Binary(data) => Some(ws::Message::Binary(data)),
        tungstenite::Message::Ping(data) => Some(ws::Message::Ping(data)),
        tungstenite::Message::Pong(data) => Some(ws::Message::Pong(data)),
        tungstenite::Message::Close(frame) => {
            Some(ws::Message::Close(frame.map(|f| ws::CloseFrame {
                code: f.code.into(),
                reason: f.reason.as_str().into(),
            })))
        }
        // Raw frames never surface from a read loop.
        tungstenite::Message::Frame(_) => None,
    }
}
