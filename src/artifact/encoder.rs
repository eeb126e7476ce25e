//! Artifact encoder
//!
//! Seals plaintext into the version 2 text container. The container carries
//! only data; the unseal-and-run logic lives in the guard shipped with this
//! binary, which the shebang line points at.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::{
    artifact_path_for, resolve_password, ArtifactFormat, GuardMetadata, SealedArtifact,
    FIELD_CIPHERTEXT, FIELD_EXPIRATION, FIELD_FORMAT, FIELD_INTEGRITY, FIELD_IV, FIELD_SALT,
};
use crate::config::settings::{validate_expiration, DEFAULT_EXPIRATION};
use crate::config::SettingsSource;
use crate::crypto::{self, derive_key, generate_iv, generate_salt};
use crate::error::{AegisError, AegisResult};
use crate::storage::FileStore;

const SHEBANG: &str = "#!/usr/bin/env -S aegis run";

/// Outcome of sealing one file
#[derive(Debug)]
pub struct SealReport {
    /// Where the artifact was written
    pub artifact_path: PathBuf,
    /// Expiration stamped into the artifact
    pub expiration: String,
    /// Why the plaintext could not be deleted, if it could not
    pub removal_error: Option<String>,
}

impl SealReport {
    /// Whether the plaintext source is gone
    pub fn source_removed(&self) -> bool {
        self.removal_error.is_none()
    }
}

/// Encrypt `plaintext` into an artifact with fresh salt and IV
pub fn seal_bytes(plaintext: &[u8], password: &[u8], expiration: &str) -> AegisResult<SealedArtifact> {
    let salt = generate_salt();
    let iv = generate_iv();
    let key = derive_key(password, &salt)?;

    let ciphertext = crypto::seal(plaintext, &key, &iv)?;
    let ciphertext_hex = hex::encode(ciphertext);
    let integrity_hash = crypto::integrity_digest(&ciphertext_hex);

    Ok(SealedArtifact {
        format: ArtifactFormat::Sealed,
        salt: salt.to_vec(),
        iv: iv.to_vec(),
        ciphertext_hex,
        guard: Some(GuardMetadata {
            integrity_hash,
            expiration: Some(expiration.to_string()),
        }),
    })
}

/// Render an artifact as the version 2 text container
///
/// Only text formats can be rendered; legacy artifacts are read-only.
pub fn render(artifact: &SealedArtifact) -> AegisResult<String> {
    let guard = match (&artifact.format, &artifact.guard) {
        (ArtifactFormat::Legacy, _) | (_, None) => {
            return Err(AegisError::UnsupportedFormat(
                "legacy artifacts cannot be written".to_string(),
            ))
        }
        (_, Some(guard)) => guard,
    };
    let expiration = guard
        .expiration
        .as_deref()
        .unwrap_or(DEFAULT_EXPIRATION);

    let iv_hex = hex::encode(&artifact.iv);
    let salt_hex = hex::encode(&artifact.salt);

    let mut lines = vec![
        SHEBANG.to_string(),
        "// Sealed with aegis. Run: aegis run <this file>".to_string(),
        "// Unseal: aegis decrypt <this file>".to_string(),
    ];
    lines.extend(
        [
            (FIELD_FORMAT, ArtifactFormat::CURRENT_VERSION),
            (FIELD_CIPHERTEXT, artifact.ciphertext_hex.as_str()),
            (FIELD_IV, iv_hex.as_str()),
            (FIELD_SALT, salt_hex.as_str()),
            (FIELD_INTEGRITY, guard.integrity_hash.as_str()),
            (FIELD_EXPIRATION, expiration),
        ]
        .into_iter()
        .map(|(name, value)| format!("const {} = \"{}\";", name, value)),
    );
    lines.push(String::new());

    Ok(lines.join("\n"))
}

/// Seal a file in place: write `<file>.enc`, then delete `<file>`
///
/// The plaintext is only deleted once the artifact write has succeeded. A
/// failed delete is reported in the `SealReport`, not as an error.
pub fn seal_file(
    store: &dyn FileStore,
    settings: &dyn SettingsSource,
    plaintext_path: &Path,
    password_override: Option<&str>,
) -> AegisResult<SealReport> {
    let password = resolve_password(password_override, settings)?;
    let expiration = settings.expiration().to_string();
    validate_expiration(&expiration)?;

    let plaintext = store.read(plaintext_path)?;
    let artifact = seal_bytes(&plaintext, password.as_bytes(), &expiration)?;
    let text = render(&artifact)?;

    let artifact_path = artifact_path_for(plaintext_path);
    store.write(&artifact_path, text.as_bytes())?;
    info!(artifact = %artifact_path.display(), %expiration, "artifact written");

    let removal_error = match store.remove(plaintext_path) {
        Ok(()) => None,
        Err(e) => {
            warn!(source = %plaintext_path.display(), error = %e, "could not delete plaintext");
            Some(e.to_string())
        }
    };

    Ok(SealReport {
        artifact_path,
        expiration,
        removal_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::decoder::{decode, open};
    use crate::config::ProjectSettings;
    use crate::storage::LocalFileStore;
    use std::cell::RefCell;
    use tempfile::TempDir;

    fn settings_with_secret(secret: &str) -> ProjectSettings {
        ProjectSettings {
            secret: Some(secret.to_string()),
            expiration: "2099-12-31".to_string(),
            ..Default::default()
        }
    }

    /// Local store whose writes or removals can be made to fail
    #[derive(Default)]
    struct FlakyStore {
        fail_write: bool,
        fail_remove: bool,
        removed: RefCell<Vec<PathBuf>>,
    }

    impl FileStore for FlakyStore {
        fn read(&self, path: &Path) -> AegisResult<Vec<u8>> {
            LocalFileStore.read(path)
        }

        fn write(&self, path: &Path, contents: &[u8]) -> AegisResult<()> {
            if self.fail_write {
                return Err(AegisError::Io("disk full".into()));
            }
            LocalFileStore.write(path, contents)
        }

        fn remove(&self, path: &Path) -> AegisResult<()> {
            if self.fail_remove {
                return Err(AegisError::Io("permission denied".into()));
            }
            self.removed.borrow_mut().push(path.to_path_buf());
            LocalFileStore.remove(path)
        }
    }

    #[test]
    fn test_seal_bytes_fields() {
        let artifact = seal_bytes(b"console.log(1)", b"pw", "2030-01-01").unwrap();

        assert_eq!(artifact.format, ArtifactFormat::Sealed);
        assert_eq!(artifact.salt.len(), 16);
        assert_eq!(artifact.iv.len(), 16);
        assert_eq!(artifact.ciphertext_hex.len(), 32);
        let guard = artifact.guard.as_ref().unwrap();
        assert_eq!(guard.integrity_hash, crypto::integrity_digest(&artifact.ciphertext_hex));
        assert_eq!(guard.expiration.as_deref(), Some("2030-01-01"));
    }

    #[test]
    fn test_salt_and_iv_fresh_per_seal() {
        let a = seal_bytes(b"same", b"pw", "2030-01-01").unwrap();
        let b = seal_bytes(b"same", b"pw", "2030-01-01").unwrap();
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.ciphertext_hex, b.ciphertext_hex);
    }

    #[test]
    fn test_render_contains_all_fields() {
        let artifact = seal_bytes(b"data", b"pw", "2030-01-01").unwrap();
        let text = render(&artifact).unwrap();

        assert!(text.starts_with("#!/usr/bin/env -S aegis run\n"));
        assert!(text.contains("const AEGIS_FORMAT = \"2\";"));
        assert!(text.contains(&format!("const ENCRYPTED_DATA = \"{}\";", artifact.ciphertext_hex)));
        assert!(text.contains(&format!("const IV_HEX = \"{}\";", hex::encode(&artifact.iv))));
        assert!(text.contains(&format!("const SALT_HEX = \"{}\";", hex::encode(&artifact.salt))));
        assert!(text.contains("const EXPIRATION_DATE = \"2030-01-01\";"));
    }

    #[test]
    fn test_rendered_artifact_decodes() {
        let artifact = seal_bytes(b"payload", b"pw", "2030-01-01").unwrap();
        let text = render(&artifact).unwrap();

        let decoded = decode(text.as_bytes()).unwrap();
        assert_eq!(decoded, artifact);
        assert_eq!(open(&decoded, b"pw").unwrap(), b"payload");
    }

    #[test]
    fn test_seal_file_replaces_plaintext() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("app.js");
        std::fs::write(&source, b"console.log('hi')").unwrap();

        let report =
            seal_file(&LocalFileStore, &settings_with_secret("s3cret"), &source, None).unwrap();

        assert!(!source.exists());
        assert!(report.source_removed());
        assert_eq!(report.artifact_path, temp_dir.path().join("app.js.enc"));
        assert_eq!(report.expiration, "2099-12-31");

        let bytes = std::fs::read(&report.artifact_path).unwrap();
        let artifact = decode(&bytes).unwrap();
        assert_eq!(open(&artifact, b"s3cret").unwrap(), b"console.log('hi')");
    }

    #[test]
    fn test_seal_file_missing_secret_keeps_plaintext() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("notes.txt");
        std::fs::write(&source, b"keep me").unwrap();

        let result = seal_file(&LocalFileStore, &ProjectSettings::default(), &source, None);

        assert!(matches!(result, Err(AegisError::MissingSecret)));
        assert!(source.exists());
        assert!(!temp_dir.path().join("notes.txt.enc").exists());
    }

    #[test]
    fn test_malformed_expiration_keeps_plaintext() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("notes.txt");
        std::fs::write(&source, b"keep me").unwrap();

        for expiration in ["2030-1-5", "2030-01-01\"", "soon"] {
            let settings = ProjectSettings {
                secret: Some("pw".to_string()),
                expiration: expiration.to_string(),
                ..Default::default()
            };
            let result = seal_file(&LocalFileStore, &settings, &source, None);

            assert!(matches!(result, Err(AegisError::Config(_))), "{}", expiration);
            assert_eq!(std::fs::read(&source).unwrap(), b"keep me");
            assert!(!temp_dir.path().join("notes.txt.enc").exists());
        }
    }

    #[test]
    fn test_seal_file_leaves_neighbouring_files_alone() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("notes.txt");
        let neighbour = temp_dir.path().join("notes.txt.enc.tmp");
        std::fs::write(&source, b"private").unwrap();
        std::fs::write(&neighbour, b"user data").unwrap();

        seal_file(&LocalFileStore, &settings_with_secret("pw"), &source, None).unwrap();

        assert_eq!(std::fs::read(&neighbour).unwrap(), b"user data");
    }

    #[test]
    fn test_failed_write_never_deletes_plaintext() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("notes.txt");
        std::fs::write(&source, b"keep me").unwrap();

        let store = FlakyStore {
            fail_write: true,
            ..Default::default()
        };
        let result = seal_file(&store, &settings_with_secret("pw"), &source, None);

        assert!(matches!(result, Err(AegisError::Io(_))));
        assert!(store.removed.borrow().is_empty());
        assert_eq!(std::fs::read(&source).unwrap(), b"keep me");
    }

    #[test]
    fn test_failed_delete_is_not_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("notes.txt");
        std::fs::write(&source, b"stuck").unwrap();

        let store = FlakyStore {
            fail_remove: true,
            ..Default::default()
        };
        let report = seal_file(&store, &settings_with_secret("pw"), &source, None).unwrap();

        assert!(!report.source_removed());
        assert!(report.removal_error.unwrap().contains("permission denied"));
        assert!(report.artifact_path.exists());
        assert!(source.exists());
    }

    #[test]
    fn test_override_password_wins() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("a.txt");
        std::fs::write(&source, b"abc").unwrap();

        let report = seal_file(
            &LocalFileStore,
            &settings_with_secret("settings-secret"),
            &source,
            Some("manual"),
        )
        .unwrap();

        let artifact = decode(&std::fs::read(&report.artifact_path).unwrap()).unwrap();
        assert_eq!(open(&artifact, b"manual").unwrap(), b"abc");
    }

    #[test]
    fn test_render_rejects_legacy() {
        let artifact = SealedArtifact {
            format: ArtifactFormat::Legacy,
            salt: vec![0; 16],
            iv: vec![0; 16],
            ciphertext_hex: "00".repeat(16),
            guard: None,
        };
        assert!(matches!(render(&artifact), Err(AegisError::UnsupportedFormat(_))));
    }
}
