//! RS256 token issuance and verification.
//!
//! Access tokens live for [`JwtConfig::access_token_expiry`] seconds (15 minutes
//! by default) and carry the caller's role claims. Refresh tokens live for
//! [`JwtConfig::refresh_token_expiry`] seconds (30 days by default), carry no
//! roles and are never accepted by [`TokenVerifier::verify`].
//!
//! # Example
//!
//! ```ignore
//! let tokens = TokenService::new(keys, &jwt_config)?;
//! let pair = tokens.issue(&user)?;
//!
//! let verified = tokens.verify(&pair.access_token)?;
//! assert_eq!(verified.roles, vec!["ROLE_PATIENT"]);
//! ```

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{Algorithm, Header, Validation, decode, encode};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use bookease_config::JwtConfig;
use bookease_core::DomainError;
use bookease_models::User;

use crate::claims::{AccessTokenClaims, RefreshTokenClaims};
use crate::keys::KeyPair;

/// A freshly issued access/refresh token pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// The identity extracted from a verified access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub subject: String,
    pub roles: Vec<String>,
    pub expires_at: DateTime<Utc>,
}

/// Signs access and refresh tokens with the private key.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    keys: Arc<KeyPair>,
    issuer: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    /// Fails when a configured lifetime does not fit a [`Duration`].
    pub fn new(keys: Arc<KeyPair>, config: &JwtConfig) -> Result<Self, DomainError> {
        Ok(Self {
            keys,
            issuer: config.issuer.clone(),
            access_ttl: lifetime("JWT_ACCESS_EXPIRY", config.access_token_expiry)?,
            refresh_ttl: lifetime("JWT_REFRESH_EXPIRY", config.refresh_token_expiry)?,
        })
    }

    /// Issues both tokens for `user`.
    ///
    /// The caller is responsible for having checked the password and the
    /// account flags.
    pub fn issue(&self, user: &User) -> Result<TokenPair, DomainError> {
        Ok(TokenPair {
            access_token: self.access_token(user)?,
            refresh_token: self.refresh_token(&user.username)?,
        })
    }

    pub fn access_token(&self, user: &User) -> Result<String, DomainError> {
        let now = Utc::now();
        let claims = AccessTokenClaims {
            sub: user.username.clone(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + self.access_ttl).timestamp(),
            roles: user.authorities(),
        };

        self.sign(&claims)
    }

    pub fn refresh_token(&self, username: &str) -> Result<String, DomainError> {
        let now = Utc::now();
        let claims = RefreshTokenClaims {
            sub: username.to_string(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + self.refresh_ttl).timestamp(),
        };

        self.sign(&claims)
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, DomainError> {
        encode(
            &Header::new(Algorithm::RS256),
            claims,
            self.keys.encoding_key(),
        )
        .map_err(|e| DomainError::TokenGeneration(e.to_string()))
    }
}

fn lifetime(setting: &str, seconds: i64) -> Result<Duration, DomainError> {
    Duration::try_seconds(seconds)
        .ok_or_else(|| DomainError::TokenGeneration(format!("{setting} out of range: {seconds}")))
}

/// Checks signatures against the public key and extracts the caller's identity.
///
/// Verification is pure computation and safe to share across requests.
#[derive(Clone)]
pub struct TokenVerifier {
    keys: Arc<KeyPair>,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(keys: Arc<KeyPair>, config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = 0;
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        Self { keys, validation }
    }

    /// Verifies an access token.
    ///
    /// Refresh tokens are rejected as malformed since they carry no roles.
    pub fn verify(&self, token: &str) -> Result<VerifiedToken, DomainError> {
        let claims: AccessTokenClaims = self.decode(token)?;
        let expires_at =
            DateTime::from_timestamp(claims.exp, 0).ok_or(DomainError::MalformedToken)?;

        Ok(VerifiedToken {
            subject: claims.sub,
            roles: claims.roles,
            expires_at,
        })
    }

    /// Verifies a refresh token. Access tokens are rejected.
    pub fn verify_refresh(&self, token: &str) -> Result<RefreshTokenClaims, DomainError> {
        self.decode(token)
    }

    fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<T, DomainError> {
        decode::<T>(token, self.keys.decoding_key(), &self.validation)
            .map(|data| data.claims)
            .map_err(map_jwt_error)
    }
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("issuer", &self.validation.iss)
            .finish_non_exhaustive()
    }
}

fn map_jwt_error(err: JwtError) -> DomainError {
    debug!(error = %err, "Token rejected");
    match err.kind() {
        ErrorKind::ExpiredSignature => DomainError::Expired,
        ErrorKind::InvalidSignature => DomainError::InvalidSignature,
        _ => DomainError::MalformedToken,
    }
}

/// Issuer and verifier over one shared key pair.
#[derive(Debug, Clone)]
pub struct TokenService {
    issuer: TokenIssuer,
    verifier: TokenVerifier,
}

impl TokenService {
    pub fn new(keys: Arc<KeyPair>, config: &JwtConfig) -> Result<Self, DomainError> {
        Ok(Self {
            issuer: TokenIssuer::new(keys.clone(), config)?,
            verifier: TokenVerifier::new(keys, config),
        })
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    pub fn issue(&self, user: &User) -> Result<TokenPair, DomainError> {
        self.issuer.issue(user)
    }

    pub fn verify(&self, token: &str) -> Result<VerifiedToken, DomainError> {
        self.verifier.verify(token)
    }
}
