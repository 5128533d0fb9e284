//! The caller's identity for the current request.
//!
//! Depending on the call path the authenticated principal is either a
//! verified token or a credential-store record. [`Principal::username`] is the
//! single place where either shape is reduced to a username.

use tracing::debug;

use bookease_models::RoleName;

use crate::jwt::VerifiedToken;

/// A credential-store view of an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDetails {
    pub username: String,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    /// Claims extracted from a verified access token.
    Token(VerifiedToken),
    /// An account loaded from the credential store.
    Credentials(UserDetails),
    /// Any other representation, reduced to a plain string.
    Opaque(String),
}

impl Principal {
    pub fn username(&self) -> &str {
        match self {
            Principal::Token(token) => &token.subject,
            Principal::Credentials(details) => &details.username,
            Principal::Opaque(name) => name,
        }
    }

    /// Role claims carried by the principal. Opaque principals carry none.
    pub fn roles(&self) -> &[String] {
        match self {
            Principal::Token(token) => &token.roles,
            Principal::Credentials(details) => &details.roles,
            Principal::Opaque(_) => &[],
        }
    }

    /// Claims without the `ROLE_` prefix or naming an unknown role never match.
    pub fn has_role(&self, role: RoleName) -> bool {
        self.roles()
            .iter()
            .any(|claim| RoleName::from_authority(claim) == Some(role))
    }

    fn kind(&self) -> &'static str {
        match self {
            Principal::Token(_) => "token",
            Principal::Credentials(_) => "credentials",
            Principal::Opaque(_) => "opaque",
        }
    }
}

/// Request-scoped authentication state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityContext {
    authentication: Option<Principal>,
}

impl SecurityContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(principal: Principal) -> Self {
        Self {
            authentication: Some(principal),
        }
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.authentication.as_ref()
    }
}

/// Returns the username of the current caller, or `None` when the request is
/// anonymous. Never fails.
pub fn resolve_current_username(ctx: &SecurityContext) -> Option<String> {
    let principal = ctx.principal()?;
    debug!(principal = principal.kind(), "Resolving current username");
    Some(principal.username().to_string())
}
