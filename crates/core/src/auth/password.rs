//! Salted password digests.
//!
//! Digest = SHA-256 over `salt || password`, with a fresh 16-byte random salt
//! per credential. Both salt and digest are stored base64-encoded on the user
//! record.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};

const SALT_LEN: usize = 16;

/// Hashes a password with a fresh random salt.
///
/// Returns `(digest_b64, salt_b64)`.
pub fn hash_password(password: &str) -> (String, String) {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);

    let digest = digest_with_salt(&salt, password);
    (STANDARD.encode(digest), STANDARD.encode(salt))
}

/// Checks a password against a stored digest and salt.
///
/// Undecodable stored material is treated as a mismatch rather than an error;
/// a corrupt credential must never authenticate.
pub fn verify_password(password: &str, digest_b64: &str, salt_b64: &str) -> bool {
    let Ok(salt) = STANDARD.decode(salt_b64) else {
        return false;
    };
    let Ok(expected) = STANDARD.decode(digest_b64) else {
        return false;
    };

    digest_with_salt(&salt, password).as_slice() == expected.as_slice()
}

fn digest_with_salt(salt: &[u8], password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}
