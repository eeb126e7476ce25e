//! Custom error types for Aegis
//!
//! This module defines the error hierarchy for the sealing tool and the
//! runtime guard using thiserror for ergonomic error definitions.

use thiserror::Error;

/// The main error type for Aegis operations
#[derive(Error, Debug)]
pub enum AegisError {
    /// No password override and no project secret configured
    #[error("No password provided and no aegis.json secret found")]
    MissingSecret,

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors (read, write, delete)
    #[error("I/O error: {0}")]
    Io(String),

    /// Key derivation or cipher setup errors
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Content matches neither the text artifact nor the legacy byte layout
    #[error("Unsupported artifact format: {0}")]
    UnsupportedFormat(String),

    /// Padding check failed while unsealing, usually a wrong password
    #[error("Decryption failed: wrong password or corrupted artifact")]
    DecryptionFailure,

    /// Embedded digest does not match the embedded ciphertext
    #[error("File corrupted or tampered with")]
    TamperedArtifact,

    /// Today's date is past the artifact's expiration date
    #[error("License expired on {expiration}. This code is no longer valid, please contact the author")]
    LicenseExpired { expiration: String },

    /// The guard could not unlock the artifact with the collected password
    #[error("Access denied: invalid license code")]
    AccessDenied,
}

impl AegisError {
    /// Create an I/O error carrying the path it happened on
    pub fn io_at(action: &str, path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        Self::Io(format!("Failed to {} {}: {}", action, path.display(), err))
    }

    /// Check if this is a runtime guard gate failure
    pub fn is_gate_failure(&self) -> bool {
        matches!(
            self,
            Self::LicenseExpired { .. } | Self::TamperedArtifact | Self::AccessDenied
        )
    }

    /// Process exit code used by the runtime guard
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::LicenseExpired { .. } => 3,
            Self::TamperedArtifact => 4,
            Self::AccessDenied => 5,
            _ => 1,
        }
    }
}

impl From<std::io::Error> for AegisError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type alias for Aegis operations
pub type AegisResult<T> = Result<T, AegisError>;
