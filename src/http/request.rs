//! Request classification and transformation.
//!
//! # Responsibilities
//! - Stamp a unique request ID (UUID v4) as early as possible
//! - Classify upgrade requests vs. plain HTTP
//! - Build the outbound request pieces: joined path, filtered headers
//!
//! # Design Decisions
//! - Hop-by-hop headers are stripped before forwarding; everything else is
//!   copied verbatim, so an inbound `Authorization` travels through unchanged
//! - Path joining guarantees exactly one `/` at the prefix/remainder seam
//!   regardless of existing slashes on either side

use std::task::{Context, Poll};

use axum::http::{header, HeaderMap, HeaderValue, Method, Request, Uri};
use tower::{Layer, Service};
use uuid::Uuid;

use crate::load_balancer::Target;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Headers meaningful only for one transport connection; never forwarded
/// across the gateway.
pub const HOP_BY_HOP_HEADERS: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Layer that stamps `x-request-id` on requests that lack one.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for RequestIdService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        if !request.headers().contains_key(X_REQUEST_ID) {
            if let Ok(value) = HeaderValue::from_str(&Uuid::new_v4().to_string()) {
                request.headers_mut().insert(X_REQUEST_ID, value);
            }
        }
        self.inner.call(request)
    }
}

/// Whether a request asks to switch the connection to WebSocket.
///
/// A request qualifies iff the method is GET, `Upgrade` equals "websocket"
/// case-insensitively, and `Connection` contains "upgrade" as a
/// case-insensitive substring. Anything else is handled as plain HTTP.
pub fn is_upgrade_request<B>(request: &Request<B>) -> bool {
    if request.method() != Method::GET {
        return false;
    }

    let upgrade = request
        .headers()
        .get(header::UPGRADE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.eq_ignore_ascii_case("websocket"))
        .unwrap_or(false);

    let connection = request
        .headers()
        .get(header::CONNECTION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_ascii_lowercase().contains("upgrade"))
        .unwrap_or(false);

    upgrade && connection
}

/// Join a target path prefix and a remainder path with exactly one `/` at
/// the seam.
pub fn single_joining_slash(a: &str, b: &str) -> String {
    let a_slash = a.ends_with('/');
    let b_slash = b.starts_with('/');
    match (a_slash, b_slash) {
        (true, true) => format!("{}{}", a, &b[1..]),
        (false, false) => format!("{}/{}", a, b),
        _ => format!("{}{}", a, b),
    }
}

/// Copy inbound headers minus the hop-by-hop set.
pub fn forward_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(inbound.len());
    for (name, value) in inbound {
        if HOP_BY_HOP_HEADERS.contains(&name.as_str()) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers
}

/// Build the outbound URI: scheme/authority from the target, joined path,
/// query copied verbatim.
pub fn build_upstream_uri(
    target: &Target,
    remainder: &str,
    query: Option<&str>,
) -> Result<Uri, axum::http::Error> {
    let path = single_joining_slash(target.prefix(), remainder);
    let path_and_query = match query {
        Some(q) => format!("{}?{}", path, q),
        None => path,
    };

    Uri::builder()
        .scheme(target.http_scheme())
        .authority(target.authority())
        .path_and_query(path_and_query)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_single_joining_slash() {
        assert_eq!(single_joining_slash("/api/", "/x"), "/api/x");
        assert_eq!(single_joining_slash("/api", "x"), "/api/x");
        assert_eq!(single_joining_slash("/api/", "x"), "/api/x");
        assert_eq!(single_joining_slash("/api", "/x"), "/api/x");
    }

    #[test]
    fn test_forward_headers_strips_hop_by_hop() {
        let mut inbound = HeaderMap::new();
        inbound.insert("connection", HeaderValue::from_static("keep-alive, upgrade"));
        inbound.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        inbound.insert("proxy-authenticate", HeaderValue::from_static("Basic"));
        inbound.insert("proxy-authorization", HeaderValue::from_static("Basic abc"));
        inbound.insert("te", HeaderValue::from_static("trailers"));
        inbound.insert("trailer", HeaderValue::from_static("Expires"));
        inbound.insert("transfer-encoding", HeaderValue::from_static("chunked"));
        inbound.insert("upgrade", HeaderValue::from_static("websocket"));
        inbound.insert("authorization", HeaderValue::from_static("Bearer token"));
        inbound.insert("accept", HeaderValue::from_static("application/json"));

        let outbound = forward_headers(&inbound);

        for name in HOP_BY_HOP_HEADERS {
            assert!(!outbound.contains_key(name), "{} should be stripped", name);
        }
        assert_eq!(outbound["authorization"], "Bearer token");
        assert_eq!(outbound["accept"], "application/json");
    }

    #[test]
    fn test_upgrade_classification_case_insensitive() {
        let request = Request::builder()
            .method(Method::GET)
            .header("Upgrade", "WebSocket")
            .header("Connection", "Keep-Alive, Upgrade")
            .body(Body::empty())
            .unwrap();
        assert!(is_upgrade_request(&request));
    }

    #[test]
    fn test_plain_get_is_not_upgrade() {
        let request = Request::builder()
            .method(Method::GET)
            .body(Body::empty())
            .unwrap();
        assert!(!is_upgrade_request(&request));
    }

    #[test]
    fn test_upgrade_requires_connection_header() {
        let request = Request::builder()
            .method(Method::GET)
            .header("Upgrade", "websocket")
            .body(Body::empty())
            .unwrap();
        assert!(!is_upgrade_request(&request));
    }

    #[test]
    fn test_non_get_is_not_upgrade() {
        let request = Request::builder()
            .method(Method::POST)
            .header("Upgrade", "websocket")
            .header("Connection", "upgrade")
            .body(Body::empty())
            .unwrap();
        assert!(!is_upgrade_request(&request));
    }

    #[test]
    fn test_build_upstream_uri() {
        let target = Target::parse("http://127.0.0.1:9001/api").unwrap();
        let uri = build_upstream_uri(&target, "/users/42", Some("page=2")).unwrap();
        assert_eq!(uri.to_string(), "http://127.0.0.1:9001/api/users/42?page=2");

        let uri = build_upstream_uri(&target, "/", None).unwrap();
        assert_eq!(uri.to_string(), "http://127.0.0.1:9001/api/");
    }
}
