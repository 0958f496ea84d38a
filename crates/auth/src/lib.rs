//! `assetdesk-auth` — identity boundary for attribution.
//!
//! Mutations are attributed to a caller identity carried in a bearer token.
//! This crate stays decoupled from HTTP and storage: claims + validation
//! only. Absence of an identity is a valid, detectable state handled by the
//! domain (soft delete refuses it; create/update record a null actor).

pub mod claims;
pub mod jwt;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtValidator, TokenError};
