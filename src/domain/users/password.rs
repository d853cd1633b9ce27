//! Password hashing.

use sha2::{Digest, Sha256};

/// SHA-256 of the password as lower-case hex, the format stored in `users.password_hash`.
pub fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

/// Compare a typed password against a stored hash, ignoring hex case.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    hash_password(password).eq_ignore_ascii_case(stored_hash.trim())
}
