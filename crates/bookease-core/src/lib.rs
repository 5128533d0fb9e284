//! # BookEase Core
//!
//! Foundational types shared by every BookEase crate:
//!
//! - [`errors`]: [`DomainError`] for typed failures and [`AppError`] for HTTP responses
//! - [`password`]: pluggable password hashing with a bcrypt implementation
//!
//! # Example
//!
//! ```ignore
//! use bookease_core::{AppError, DomainError, BcryptHasher, PasswordHasher};
//!
//! let hasher = BcryptHasher::default();
//! let hash = hasher.hash("S3nha@Forte")?;
//!
//! let err: AppError = DomainError::duplicate_field("CNPJ").into();
//! ```

pub mod errors;
pub mod password;

pub use errors::{AppError, DomainError};
pub use password::{BcryptHasher, PasswordHasher};
