//! Cryptographic functions for Aegis
//!
//! Provides AES-256-CBC encryption with scrypt key derivation, plus the
//! SHA-256 integrity digest embedded in sealed artifacts.

pub mod encryption;
pub mod key_derivation;
pub mod secure_memory;

use sha2::{Digest, Sha256};

pub use encryption::{generate_iv, seal, unseal, IV_SIZE};
pub use key_derivation::{derive_key, generate_salt, DerivedKey, SALT_SIZE};
pub use secure_memory::SecureString;

/// SHA-256 over the hex text of a ciphertext, as lowercase hex.
///
/// The digest covers the hex representation rather than the raw bytes, so it
/// can be checked against the embedded field without decoding it first.
pub fn integrity_digest(ciphertext_hex: &str) -> String {
    hex::encode(Sha256::digest(ciphertext_hex.as_bytes()))
}
