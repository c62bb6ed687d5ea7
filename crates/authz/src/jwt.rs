use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use quire_db::ObjectId;
use quire_kernel::settings::AuthSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

use crate::{Caller, IdentityResolver};

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("token generation failed: {0}")]
    TokenGeneration(#[from] jsonwebtoken::errors::Error),

    #[error("jwt secret is not configured")]
    MissingSecret,
}

/// Identity section of the token payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClaimsUser {
    pub id: ObjectId,
}

/// Token payload: `{"user": {"id": ...}, "iat": ..., "exp": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub user: ClaimsUser,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: ObjectId, ttl_secs: u64) -> Self {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        Self {
            user: ClaimsUser { id: user_id },
            iat: now,
            exp: now.saturating_add(i64::try_from(ttl_secs).unwrap_or(i64::MAX)),
        }
    }
}

/// HS256 token issuer and resolver.
pub struct JwtResolver {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: u64,
}

impl std::fmt::Debug for JwtResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtResolver")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl JwtResolver {
    pub fn new(settings: &AuthSettings) -> Result<Self, AuthError> {
        if settings.jwt_secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }

        let secret = settings.jwt_secret.as_bytes();
        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
            ttl_secs: settings.token_ttl_secs,
        })
    }

    /// Issues a token for `user_id` valid for the configured lifetime.
    pub fn issue(&self, user_id: ObjectId) -> Result<String, AuthError> {
        self.issue_claims(&Claims::new(user_id, self.ttl_secs))
    }

    pub fn issue_claims(&self, claims: &Claims) -> Result<String, AuthError> {
        Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding)?)
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }
}

impl IdentityResolver for JwtResolver {
    fn resolve(&self, token: &str) -> Option<Caller> {
        match decode::<Claims>(token, &self.decoding, &self.validation) {
            Ok(data) => Some(Caller::new(data.claims.user.id)),
            Err(err) => {
                tracing::debug!(error = %err, "rejected bearer token");
                None
            }
        }
    }
}
