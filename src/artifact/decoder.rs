//! Artifact decoder
//!
//! Detects which of the three artifact shapes a file has and extracts its
//! fields. Text artifacts win whenever the three field markers are present,
//! even though such a file would also be long enough to read as legacy bytes.
//! Invalid UTF-8 elsewhere in the file does not hide the markers.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{
    original_path_for, resolve_password, ArtifactFormat, GuardMetadata, SealedArtifact,
    FIELD_CIPHERTEXT, FIELD_EXPIRATION, FIELD_FORMAT, FIELD_INTEGRITY, FIELD_IV, FIELD_SALT,
};
use crate::config::SettingsSource;
use crate::crypto::{self, derive_key, encryption::BLOCK_SIZE, IV_SIZE, SALT_SIZE};
use crate::error::{AegisError, AegisResult};
use crate::storage::FileStore;

/// Salt plus IV at the front of a legacy artifact
const LEGACY_HEADER_SIZE: usize = SALT_SIZE + IV_SIZE;

/// Outcome of unsealing one artifact
#[derive(Debug)]
pub struct UnsealReport {
    /// Where the plaintext was written
    pub output_path: PathBuf,
    /// Shape the artifact was read as
    pub format: ArtifactFormat,
}

/// `NAME = "value"` fields found in a text artifact
#[derive(Debug, Default)]
struct TextFields<'a> {
    format: Option<&'a str>,
    ciphertext: Option<&'a str>,
    iv: Option<&'a str>,
    salt: Option<&'a str>,
    integrity: Option<&'a str>,
    expiration: Option<&'a str>,
}

impl<'a> TextFields<'a> {
    /// Collect known fields; `None` unless all three cipher markers are present
    fn scan(text: &'a str) -> Option<Self> {
        let mut fields = Self::default();

        for line in text.lines() {
            let Some((name, value)) = parse_field(line) else {
                continue;
            };
            let slot = match name {
                FIELD_FORMAT => &mut fields.format,
                FIELD_CIPHERTEXT => &mut fields.ciphertext,
                FIELD_IV => &mut fields.iv,
                FIELD_SALT => &mut fields.salt,
                FIELD_INTEGRITY => &mut fields.integrity,
                FIELD_EXPIRATION => &mut fields.expiration,
                _ => continue,
            };
            // First occurrence wins
            slot.get_or_insert(value);
        }

        (fields.ciphertext.is_some() && fields.iv.is_some() && fields.salt.is_some())
            .then_some(fields)
    }

    fn into_artifact(self) -> AegisResult<SealedArtifact> {
        let format = match self.format {
            None => ArtifactFormat::Script,
            Some(ArtifactFormat::CURRENT_VERSION) => ArtifactFormat::Sealed,
            Some(other) => {
                return Err(AegisError::UnsupportedFormat(format!(
                    "unknown artifact format version {:?}",
                    other
                )))
            }
        };

        let salt = decode_hex_field(FIELD_SALT, self.salt.unwrap_or_default(), SALT_SIZE)?;
        let iv = decode_hex_field(FIELD_IV, self.iv.unwrap_or_default(), IV_SIZE)?;

        let guard = self.integrity.map(|hash| GuardMetadata {
            integrity_hash: hash.to_string(),
            expiration: self.expiration.map(str::to_string),
        });

        Ok(SealedArtifact {
            format,
            salt,
            iv,
            ciphertext_hex: self.ciphertext.unwrap_or_default().to_string(),
            guard,
        })
    }
}

/// Parse `const NAME = "value";` (the `const` and `;` are optional)
fn parse_field(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    let line = line.strip_prefix("const ").unwrap_or(line);
    let (name, value) = line.split_once('=')?;

    let value = value.trim().trim_end_matches(';').trim_end();
    let value = value.strip_prefix('"')?.strip_suffix('"')?;

    Some((name.trim(), value))
}

fn decode_hex_field(name: &str, value: &str, expected_len: usize) -> AegisResult<Vec<u8>> {
    let bytes = hex::decode(value)
        .map_err(|e| AegisError::UnsupportedFormat(format!("{} is not valid hex: {}", name, e)))?;

    if bytes.len() != expected_len {
        return Err(AegisError::UnsupportedFormat(format!(
            "{} must be {} bytes, found {}",
            name,
            expected_len,
            bytes.len()
        )));
    }

    Ok(bytes)
}

fn decode_legacy(bytes: &[u8]) -> AegisResult<SealedArtifact> {
    if bytes.len() < LEGACY_HEADER_SIZE {
        return Err(AegisError::UnsupportedFormat(format!(
            "file is {} bytes, shorter than the {}-byte legacy header",
            bytes.len(),
            LEGACY_HEADER_SIZE
        )));
    }

    let (header, ciphertext) = bytes.split_at(LEGACY_HEADER_SIZE);
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(AegisError::UnsupportedFormat(format!(
            "legacy ciphertext of {} bytes is not a whole number of cipher blocks",
            ciphertext.len()
        )));
    }

    let (salt, iv) = header.split_at(SALT_SIZE);
    Ok(SealedArtifact {
        format: ArtifactFormat::Legacy,
        salt: salt.to_vec(),
        iv: iv.to_vec(),
        ciphertext_hex: hex::encode(ciphertext),
        guard: None,
    })
}

/// Detect the artifact's shape and extract its fields
pub fn decode(bytes: &[u8]) -> AegisResult<SealedArtifact> {
    let text = String::from_utf8_lossy(bytes);
    if let Some(fields) = TextFields::scan(&text) {
        debug!(version = ?fields.format, "found text artifact markers");
        return fields.into_artifact();
    }

    debug!(len = bytes.len(), "no text markers, reading as legacy binary");
    decode_legacy(bytes)
}

/// Derive the key and decrypt an artifact's ciphertext
///
/// Does not run the integrity or expiration gates; see `guard`.
pub fn open(artifact: &SealedArtifact, password: &[u8]) -> AegisResult<Vec<u8>> {
    let ciphertext = artifact.ciphertext()?;
    let key = derive_key(password, &artifact.salt)?;
    crypto::unseal(&ciphertext, &key, &artifact.iv)
}

/// Unseal an artifact and write the plaintext back under its original name
///
/// The artifact itself is left in place.
pub fn unseal_file(
    store: &dyn FileStore,
    settings: &dyn SettingsSource,
    artifact_path: &Path,
    password_override: Option<&str>,
) -> AegisResult<UnsealReport> {
    let password = resolve_password(password_override, settings)?;

    let bytes = store.read(artifact_path)?;
    let artifact = decode(&bytes)?;
    let plaintext = open(&artifact, password.as_bytes())?;

    let output_path = original_path_for(artifact_path, artifact.format);
    store.write(&output_path, &plaintext)?;
    info!(output = %output_path.display(), format = %artifact.format, "artifact unsealed");

    Ok(UnsealReport {
        output_path,
        format: artifact.format,
    })
}
