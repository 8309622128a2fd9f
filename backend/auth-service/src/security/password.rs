/// Password hashing and verification using bcrypt
use crate::error::{AuthError, Result};

/// Fixed cost factor; changing it only affects newly stored hashes.
const BCRYPT_COST: u32 = 10;

/// Hash a password for storage. Intentionally CPU-expensive.
pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, BCRYPT_COST)
        .map_err(|_| AuthError::Unavailable("password hashing failed".to_string()))
}

/// Verify a password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<()> {
    let matches = bcrypt::verify(password, hash).map_err(|_| AuthError::InvalidCredentials)?;

    if matches {
        Ok(())
    } else {
        Err(AuthError::InvalidCredentials)
    }
}
