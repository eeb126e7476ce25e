//! AES-256-CBC encryption/decryption
//!
//! CBC with PKCS#7 padding is what every existing artifact uses, so it is kept
//! for compatibility. The mode is NOT authenticated: a wrong key is usually
//! caught by the padding check, but a lucky wrong key can decrypt to garbage
//! with valid padding. Callers must not treat `Ok` as proof of the right key.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;

use crate::error::{AegisError, AegisResult};

use super::DerivedKey;

/// Size of the CBC initialization vector in bytes
pub const IV_SIZE: usize = 16;

/// AES block size in bytes
pub const BLOCK_SIZE: usize = 16;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Generate a fresh random IV
pub fn generate_iv() -> [u8; IV_SIZE] {
    let mut iv = [0u8; IV_SIZE];
    rand::rng().fill_bytes(&mut iv);
    iv
}

/// Encrypt plaintext with AES-256-CBC
pub fn seal(plaintext: &[u8], key: &DerivedKey, iv: &[u8]) -> AegisResult<Vec<u8>> {
    let cipher = Aes256CbcEnc::new_from_slices(key.as_bytes(), iv)
        .map_err(|e| AegisError::Encryption(format!("Failed to create cipher: {}", e)))?;

    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

/// Decrypt ciphertext with AES-256-CBC
///
/// A padding failure is reported as `DecryptionFailure`.
pub fn unseal(ciphertext: &[u8], key: &DerivedKey, iv: &[u8]) -> AegisResult<Vec<u8>> {
    let cipher = Aes256CbcDec::new_from_slices(key.as_bytes(), iv)
        .map_err(|e| AegisError::Encryption(format!("Failed to create cipher: {}", e)))?;

    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| AegisError::DecryptionFailure)
}
