use bcrypt::{DEFAULT_COST, hash, verify};

use crate::errors::DomainError;

/// Pluggable password hashing used by registration and login.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    fn verify(&self, password: &str, hash: &str) -> Result<bool, DomainError>;
}

/// bcrypt-backed [`PasswordHasher`].
#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub const fn with_cost(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::with_cost(DEFAULT_COST)
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        hash(password, self.cost)
            .map_err(|e| DomainError::Internal(anyhow::anyhow!("Failed to hash password: {}", e)))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, DomainError> {
        verify(password, hash).map_err(|e| {
            DomainError::Internal(anyhow::anyhow!("Failed to verify password: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> BcryptHasher {
        BcryptHasher::with_cost(4)
    }

    #[test]
    fn test_hash_and_verify() {
        let hashed = hasher().hash("S3nha@Forte").unwrap();
        assert_ne!(hashed, "S3nha@Forte");
        assert!(hasher().verify("S3nha@Forte", &hashed).unwrap());
        assert!(!hasher().verify("outra-senha", &hashed).unwrap());
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let first = hasher().hash("password").unwrap();
        let second = hasher().hash("password").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_against_garbage_hash_fails() {
        let result = hasher().verify("password", "not-a-bcrypt-hash");
        assert!(matches!(result, Err(DomainError::Internal(_))));
    }
}
