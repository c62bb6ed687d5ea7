use std::convert::Infallible;

use axum::{
    extract::{FromRef, OptionalFromRequestParts},
    http::request::Parts,
};
use quire_db::ObjectId;

use crate::IdentityResolverArc;

/// Identity a request was authenticated as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: ObjectId,
}

impl Caller {
    pub const fn new(id: ObjectId) -> Self {
        Self { id }
    }
}

/// `Option<Caller>` is extractable from any state exposing the resolver.
///
/// Extraction never rejects: a missing or invalid credential yields `None`
/// and the handler decides whether that is an error.
impl<S> OptionalFromRequestParts<S> for Caller
where
    S: Send + Sync,
    IdentityResolverArc: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        let resolver = IdentityResolverArc::from_ref(state);
        let caller = resolver.resolve_headers(&parts.headers);
        if caller.is_none() {
            tracing::debug!(path = %parts.uri.path(), "request carries no valid credential");
        }
        Ok(caller)
    }
}
