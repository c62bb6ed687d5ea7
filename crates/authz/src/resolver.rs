use std::{fmt::Debug, sync::Arc};

use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::Caller;

/// The scheme expected in the `Authorization` header.
pub const BEARER_PREFIX: &str = "Bearer";

/// Header carrying a bare token, accepted for older clients.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Resolves the caller identity behind a credential.
pub trait IdentityResolver: Debug {
    /// Resolves a raw token. Returns `None` for anything that does not
    /// authenticate: bad signature, expired, unreadable claims.
    fn resolve(&self, token: &str) -> Option<Caller>;

    /// Resolves from request headers.
    ///
    /// `Authorization: Bearer <token>` takes precedence over `x-auth-token`.
    fn resolve_headers(&self, headers: &HeaderMap) -> Option<Caller> {
        if let Some(authorization) = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
        {
            return self.resolve_bearer(authorization);
        }

        let token = headers
            .get(AUTH_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())?
            .trim();
        if token.is_empty() {
            return None;
        }
        self.resolve(token)
    }

    /// Resolves a `Bearer <token>` string.
    fn resolve_bearer(&self, bearer: &str) -> Option<Caller> {
        let (scheme, token) = bearer.trim().split_once(' ')?;
        let token = token.trim();
        if !scheme.eq_ignore_ascii_case(BEARER_PREFIX) || token.is_empty() {
            return None;
        }
        self.resolve(token)
    }
}

/// Thread-safe shared reference to an identity resolver.
pub type IdentityResolverArc = Arc<dyn IdentityResolver + Send + Sync>;
