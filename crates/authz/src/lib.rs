//! Identity resolution for Quire: maps a bearer credential on an incoming
//! request to the [`Caller`] it was issued for.

pub mod caller;
pub mod jwt;
pub mod module;
pub mod resolver;

pub use caller::Caller;
pub use jwt::{AuthError, Claims, ClaimsUser, JwtResolver};
pub use module::{create_module, AuthzModule};
pub use resolver::{IdentityResolver, IdentityResolverArc, AUTH_TOKEN_HEADER, BEARER_PREFIX};
