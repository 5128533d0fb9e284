//! # BookEase Auth
//!
//! Session tokens and ownership checks for the BookEase API.
//!
//! - [`keys`]: loads the RSA key pair used to sign and verify tokens
//! - [`claims`]: access and refresh token claim structures
//! - [`jwt`]: [`TokenIssuer`], [`TokenVerifier`] and the [`TokenService`] bundling both
//! - [`principal`]: the caller's identity for the current request
//! - [`guard`]: the ownership check run before mutating a person-owned record
//! - [`store`]: the [`CredentialStore`] contract implemented by persistence
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use bookease_auth::{KeyPair, TokenService};
//! use bookease_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let keys = Arc::new(KeyPair::load(&config)?);
//! let tokens = TokenService::new(keys, &config)?;
//!
//! let pair = tokens.issue(&user)?;
//! let verified = tokens.verify(&pair.access_token)?;
//! assert_eq!(verified.subject, user.username);
//! ```

pub mod claims;
pub mod guard;
pub mod jwt;
pub mod keys;
pub mod principal;
pub mod store;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use claims::{AccessTokenClaims, RefreshTokenClaims};
pub use guard::verify_ownership;
pub use jwt::{TokenIssuer, TokenPair, TokenService, TokenVerifier, VerifiedToken};
pub use keys::KeyPair;
pub use principal::{Principal, SecurityContext, UserDetails, resolve_current_username};
pub use store::CredentialStore;
