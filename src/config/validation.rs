//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check routes are well-formed (prefix shape, non-empty target lists)
//! - Validate value ranges (intervals and timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GatewayConfig -> Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use crate::config::schema::GatewayConfig;
use crate::load_balancer::Target;

/// A single semantic problem found in the configuration.
#[derive(Debug)]
pub enum ValidationError {
    NoRoutes,
    DuplicateRouteName(String),
    InvalidPathPrefix { route: String, prefix: String },
    NoTargets { route: String },
    InvalidTarget { route: String, detail: String },
    MissingInternalToken,
    ZeroInterval(&'static str),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::NoRoutes => write!(f, "no routes defined"),
            ValidationError::DuplicateRouteName(name) => {
                write!(f, "duplicate route name `{}`", name)
            }
            ValidationError::InvalidPathPrefix { route, prefix } => write!(
                f,
                "route `{}`: path_prefix `{}` must start with '/' and not end with '/'",
                route, prefix
            ),
            ValidationError::NoTargets { route } => {
                write!(f, "route `{}` has no targets", route)
            }
            ValidationError::InvalidTarget { route, detail } => {
                write!(f, "route `{}`: {}", route, detail)
            }
            ValidationError::MissingInternalToken => {
                write!(f, "internal_auth.token must be set")
            }
            ValidationError::ZeroInterval(field) => {
                write!(f, "{} must be greater than zero", field)
            }
        }
    }
}

/// Validate the configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.routes.is_empty() {
        errors.push(ValidationError::NoRoutes);
    }

    let mut seen_names = std::collections::HashSet::new();
    for route in &config.routes {
        if !seen_names.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateRouteName(route.name.clone()));
        }

        let prefix = route.path_prefix.as_str();
        if !prefix.starts_with('/') || prefix.len() < 2 || prefix.ends_with('/') {
            errors.push(ValidationError::InvalidPathPrefix {
                route: route.name.clone(),
                prefix: route.path_prefix.clone(),
            });
        }

        if route.targets.is_empty() {
            errors.push(ValidationError::NoTargets {
                route: route.name.clone(),
            });
        }
        for target in &route.targets {
            if let Err(e) = Target::parse(target) {
                errors.push(ValidationError::InvalidTarget {
                    route: route.name.clone(),
                    detail: e.to_string(),
                });
            }
        }
    }

    if config.internal_auth.token.is_empty() {
        errors.push(ValidationError::MissingInternalToken);
    }

    if config.health_check.interval_secs == 0 {
        errors.push(ValidationError::ZeroInterval("health_check.interval_secs"));
    }
    if config.health_check.timeout_secs == 0 {
        errors.push(ValidationError::ZeroInterval("health_check.timeout_secs"));
    }
    if config.upstream.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroInterval("upstream.request_timeout_secs"));
    }
    if config.upstream.ws_handshake_timeout_secs == 0 {
        errors.push(ValidationError::ZeroInterval(
            "upstream.ws_handshake_timeout_secs",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
