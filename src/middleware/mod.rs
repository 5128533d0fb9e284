//! Middleware modules for request processing.
//!
//! - [`auth`]: bearer-token extractors ([`auth::AuthUser`], [`auth::TokenPrincipal`])
//! - [`role`]: route-level role gates
//!
//! # Authentication Flow
//!
//! 1. Client sends request with `Authorization: Bearer <token>` header
//! 2. A role gate extracts `AuthUser`: the token is verified and the account
//!    behind it must still be active with unrevoked tokens
//! 3. The gate compares the `ROLE_*` claims against the route's allowed roles
//! 4. The handler reuses the cached `AuthUser` and runs ownership checks where
//!    the operation mutates a record

pub mod auth;
pub mod role;
