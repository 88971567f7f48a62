//! Crate-level error types.

use thiserror::Error;

/// Errors raised while registering gateway routes.
///
/// All of these are fatal at startup: a route with a malformed target list
/// must not register, so construction fails instead of serving traffic with
/// a partial pool.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// A configured target URL failed to parse.
    #[error("invalid target url `{url}`: {source}")]
    InvalidTargetUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A target URL parsed but carries no host to connect to.
    #[error("invalid target url `{url}`: missing host")]
    MissingHost { url: String },

    /// A target URL uses a scheme the gateway cannot forward to.
    #[error("unsupported scheme `{scheme}` in target url `{url}`")]
    UnsupportedScheme { url: String, scheme: String },

    /// A route was configured with an empty target list.
    #[error("route `{route}` has no targets")]
    EmptyPool { route: String },

    /// The internal-service credential header name is not a valid header.
    #[error("invalid internal credential header name `{name}`")]
    InvalidCredentialHeader { name: String },

    /// The internal-service credential value is not a valid header value.
    #[error("internal credential value for `{name}` is not a valid header value")]
    InvalidCredentialValue { name: String },
}
