//! Key derivation using scrypt
//!
//! Derives AES-256 keys from passwords using scrypt, a memory-hard key
//! derivation function. The cost parameters match the ones every existing
//! artifact was sealed with, so they are fixed rather than configurable.

use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{AegisError, AegisResult};

/// Size of the random salt in bytes
pub const SALT_SIZE: usize = 16;

/// Size of the derived key in bytes (AES-256)
pub const KEY_SIZE: usize = 32;

/// log2 of the scrypt CPU/memory cost (N = 16384)
const SCRYPT_LOG_N: u8 = 14;
/// scrypt block size
const SCRYPT_R: u32 = 8;
/// scrypt parallelism
const SCRYPT_P: u32 = 1;

/// A derived encryption key
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_SIZE],
}

impl DerivedKey {
    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Generate a fresh random salt
pub fn generate_salt() -> [u8; SALT_SIZE] {
    let mut salt = [0u8; SALT_SIZE];
    rand::rng().fill_bytes(&mut salt);
    salt
}

/// Derive an encryption key from a password and salt
pub fn derive_key(password: &[u8], salt: &[u8]) -> AegisResult<DerivedKey> {
    let params = scrypt::Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, KEY_SIZE)
        .map_err(|e| AegisError::Encryption(format!("Invalid scrypt parameters: {}", e)))?;

    let mut key = [0u8; KEY_SIZE];
    scrypt::scrypt(password, salt, &params, &mut key)
        .map_err(|e| AegisError::Encryption(format!("Key derivation failed: {}", e)))?;

    Ok(DerivedKey { key })
}
