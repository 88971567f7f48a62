//! Response handling and transformation.
//!
//! # Responsibilities
//! - Relay backend responses to the client without modification
//! - Map forwarding failures to gateway-level status codes
//!
//! # Design Decisions
//! - Streaming responses avoid buffering the body
//! - Upstream connection errors surface as 502 Bad Gateway
//! - Upstream timeouts surface as 504 Gateway Timeout

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hyper::body::Incoming;

/// Wrap an upstream response for the client, streaming the body through
/// unmodified.
pub fn from_upstream(response: hyper::Response<Incoming>) -> Response {
    let (parts, body) = response.into_parts();
    Response::from_parts(parts, Body::new(body))
}

/// Gateway-level failure: the outbound call could not be completed.
pub fn bad_gateway() -> Response {
    (StatusCode::BAD_GATEWAY, "upstream request failed").into_response()
}

/// Gateway-level failure: the outbound call exceeded its time budget.
pub fn gateway_timeout() -> Response {
    (StatusCode::GATEWAY_TIMEOUT, "upstream request timed out").into_response()
}
