//! Sealed artifacts
//!
//! An artifact carries everything needed to unseal a file except the
//! password: salt, IV, ciphertext and, for the text formats, an integrity
//! digest and an expiration date. Three on-disk shapes exist:
//!
//! - `Sealed` (version 2): the text container this tool writes, tagged with
//!   `AEGIS_FORMAT = "2"` and runnable through `aegis run`.
//! - `Script` (version 1): the older script wrapper. Same field markers, no
//!   version tag.
//! - `Legacy`: raw `salt[16] || iv[16] || ciphertext`, no digest and no
//!   expiration.

pub mod decoder;
pub mod encoder;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::SettingsSource;
use crate::crypto::SecureString;
use crate::error::{AegisError, AegisResult};

pub use decoder::{decode, open, unseal_file, UnsealReport};
pub use encoder::{render, seal_bytes, seal_file, SealReport};

/// Field holding the hex ciphertext
pub const FIELD_CIPHERTEXT: &str = "ENCRYPTED_DATA";
/// Field holding the hex IV
pub const FIELD_IV: &str = "IV_HEX";
/// Field holding the hex salt
pub const FIELD_SALT: &str = "SALT_HEX";
/// Field holding the SHA-256 digest of the ciphertext hex
pub const FIELD_INTEGRITY: &str = "INTEGRITY_HASH";
/// Field holding the YYYY-MM-DD expiration date
pub const FIELD_EXPIRATION: &str = "EXPIRATION_DATE";
/// Field holding the format version tag
pub const FIELD_FORMAT: &str = "AEGIS_FORMAT";

/// Suffix appended to sealed files
pub const ARTIFACT_SUFFIX: &str = ".enc";

/// Suffixes stripped from text artifacts to recover the original name
const TEXT_SUFFIXES: &[&str] = &[".enc.js", ".secure.js", ".enc", ".aegis"];
/// Suffixes stripped from legacy artifacts to recover the original name
const LEGACY_SUFFIXES: &[&str] = &[".aegis", ".enc"];
/// Appended when an artifact name carries no known suffix
const FALLBACK_SUFFIX: &str = ".decrypted";

/// On-disk shape of an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    /// Versioned text container (format 2)
    Sealed,
    /// Script wrapper from earlier releases (format 1)
    Script,
    /// Raw salt || iv || ciphertext bytes
    Legacy,
}

impl ArtifactFormat {
    /// Version tag written into text artifacts
    pub const CURRENT_VERSION: &'static str = "2";

    /// Whether this format embeds the integrity digest and expiration date
    pub fn has_guard_metadata(&self) -> bool {
        !matches!(self, Self::Legacy)
    }

    fn known_suffixes(&self) -> &'static [&'static str] {
        match self {
            Self::Sealed | Self::Script => TEXT_SUFFIXES,
            Self::Legacy => LEGACY_SUFFIXES,
        }
    }
}

impl fmt::Display for ArtifactFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sealed => write!(f, "sealed (v2)"),
            Self::Script => write!(f, "script wrapper (v1)"),
            Self::Legacy => write!(f, "legacy binary"),
        }
    }
}

/// Digest and expiration carried by the text formats
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardMetadata {
    /// SHA-256 hex digest over `ciphertext_hex`
    pub integrity_hash: String,
    /// YYYY-MM-DD; `None` if the artifact never recorded one
    pub expiration: Option<String>,
}

/// A decoded artifact
///
/// The ciphertext is kept as hex text because the integrity digest is
/// defined over that text. It is only decoded to bytes when unsealing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedArtifact {
    pub format: ArtifactFormat,
    pub salt: Vec<u8>,
    pub iv: Vec<u8>,
    pub ciphertext_hex: String,
    pub guard: Option<GuardMetadata>,
}

impl SealedArtifact {
    /// Ciphertext bytes
    pub fn ciphertext(&self) -> AegisResult<Vec<u8>> {
        hex::decode(&self.ciphertext_hex).map_err(|e| {
            AegisError::UnsupportedFormat(format!("{} is not valid hex: {}", FIELD_CIPHERTEXT, e))
        })
    }
}

/// Pick the password: explicit override first, then the project secret
pub fn resolve_password(
    password_override: Option<&str>,
    settings: &dyn SettingsSource,
) -> AegisResult<SecureString> {
    password_override
        .filter(|p| !p.is_empty())
        .or_else(|| settings.secret())
        .map(SecureString::from)
        .ok_or(AegisError::MissingSecret)
}

/// Path of the artifact sealed from `plaintext_path`
pub fn artifact_path_for(plaintext_path: &Path) -> PathBuf {
    let mut name = plaintext_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(ARTIFACT_SUFFIX);
    plaintext_path.with_file_name(name)
}

/// Path the plaintext is restored to when unsealing `artifact_path`
///
/// Strips the first known suffix. An artifact with no known suffix gets
/// `.decrypted` appended so it is never overwritten by its own plaintext.
pub fn original_path_for(artifact_path: &Path, format: ArtifactFormat) -> PathBuf {
    let name = artifact_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    for suffix in format.known_suffixes() {
        if let Some(stem) = name.strip_suffix(suffix) {
            if !stem.is_empty() {
                return artifact_path.with_file_name(stem);
            }
        }
    }

    artifact_path.with_file_name(format!("{}{}", name, FALLBACK_SUFFIX))
}
