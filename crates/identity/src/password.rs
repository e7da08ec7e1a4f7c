//! Password hashing.
//!
//! bcrypt with the library's default cost. Hashes are opaque strings; no
//! other module inspects them.

use evently_core::{DomainError, DomainResult};

pub fn hash_password(plain: &str) -> DomainResult<String> {
    bcrypt::hash(plain, bcrypt::DEFAULT_COST)
        .map_err(|e| DomainError::internal(format!("password hashing failed: {e}")))
}

/// Constant-time comparison against a stored hash. Any malformed hash
/// verifies as false rather than erroring.
pub fn verify_password(plain: &str, hashed: &str) -> bool {
    bcrypt::verify(plain, hashed).unwrap_or(false)
}
