//! Runtime guard
//!
//! The access gate an artifact goes through when it is run (`aegis run`,
//! or directly via its shebang line). It is a linear state machine:
//!
//! ```text
//! Start -> ExpirationCheck -> IntegrityCheck -> AwaitingPassword
//!       -> Decrypting -> Executing -> Success
//! ```
//!
//! Every failure is terminal. There is no retry; the artifact has to be run
//! again from the start.

pub mod materialize;

use chrono::Utc;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::artifact::{decode, open, ArtifactFormat, SealedArtifact};
use crate::crypto::{self, SecureString};
use crate::error::{AegisError, AegisResult};

pub use materialize::{FileSink, InterpreterSink, Materializer, StdoutSink};

/// Where the guard is, or where it stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Start,
    ExpirationCheck,
    IntegrityCheck,
    AwaitingPassword,
    Decrypting,
    Executing,
    Success,
}

/// Supplies the password once the checks have passed
pub trait PasswordSource {
    fn collect(&mut self) -> AegisResult<SecureString>;
}

/// Reads the password from the terminal without echo
#[derive(Debug, Default)]
pub struct PromptPassword;

impl PasswordSource for PromptPassword {
    fn collect(&mut self) -> AegisResult<SecureString> {
        rpassword::prompt_password("Enter license code: ")
            .map(SecureString::from)
            .map_err(|e| AegisError::Io(format!("Failed to read license code: {}", e)))
    }
}

/// A fixed password, for `--password` and tests
#[derive(Debug)]
pub struct StaticPassword(pub SecureString);

impl PasswordSource for StaticPassword {
    fn collect(&mut self) -> AegisResult<SecureString> {
        Ok(SecureString::new(self.0.as_str()))
    }
}

enum Step {
    Start,
    ExpirationCheck(SealedArtifact),
    IntegrityCheck(SealedArtifact),
    AwaitingPassword(SealedArtifact),
    Decrypting(SealedArtifact, SecureString),
    Executing(Zeroizing<Vec<u8>>),
    Success(i32),
}

impl Step {
    fn state(&self) -> GuardState {
        match self {
            Step::Start => GuardState::Start,
            Step::ExpirationCheck(_) => GuardState::ExpirationCheck,
            Step::IntegrityCheck(_) => GuardState::IntegrityCheck,
            Step::AwaitingPassword(_) => GuardState::AwaitingPassword,
            Step::Decrypting(..) => GuardState::Decrypting,
            Step::Executing(_) => GuardState::Executing,
            Step::Success(_) => GuardState::Success,
        }
    }
}

/// Runs one artifact through the gates
#[derive(Debug)]
pub struct RuntimeGuard {
    today: String,
    state: GuardState,
}

impl RuntimeGuard {
    /// Guard evaluating expiration against `today` (YYYY-MM-DD)
    pub fn new(today: impl Into<String>) -> Self {
        Self {
            today: today.into(),
            state: GuardState::Start,
        }
    }

    /// Guard using the current UTC date
    pub fn for_today() -> Self {
        Self::new(Utc::now().format("%Y-%m-%d").to_string())
    }

    /// State reached by the last run
    pub fn state(&self) -> GuardState {
        self.state
    }

    /// Run an artifact's bytes through every gate and materialize the plaintext
    ///
    /// Returns the exit status of the materialized payload.
    pub fn run(
        &mut self,
        artifact_bytes: &[u8],
        passwords: &mut dyn PasswordSource,
        sink: &mut dyn Materializer,
    ) -> AegisResult<i32> {
        let mut step = Step::Start;

        loop {
            self.state = step.state();
            debug!(state = ?self.state, "guard step");

            step = match step {
                Step::Start => Step::ExpirationCheck(load(artifact_bytes)?),
                Step::ExpirationCheck(artifact) => {
                    self.check_expiration(&artifact)?;
                    Step::IntegrityCheck(artifact)
                }
                Step::IntegrityCheck(artifact) => {
                    check_integrity(&artifact)?;
                    Step::AwaitingPassword(artifact)
                }
                Step::AwaitingPassword(artifact) => {
                    let password = passwords.collect()?;
                    Step::Decrypting(artifact, password)
                }
                Step::Decrypting(artifact, password) => {
                    // Any failure here reads as a wrong license code
                    let plaintext = open(&artifact, password.as_bytes())
                        .map_err(|_| AegisError::AccessDenied)?;
                    Step::Executing(Zeroizing::new(plaintext))
                }
                Step::Executing(plaintext) => Step::Success(sink.materialize(&plaintext)?),
                Step::Success(status) => {
                    info!(status, "artifact executed");
                    return Ok(status);
                }
            };
        }
    }

    fn check_expiration(&self, artifact: &SealedArtifact) -> AegisResult<()> {
        let expiration = artifact
            .guard
            .as_ref()
            .and_then(|guard| guard.expiration.as_deref());

        // Lexicographic comparison, valid for YYYY-MM-DD only
        match expiration {
            Some(expiration) if self.today.as_str() > expiration => {
                Err(AegisError::LicenseExpired {
                    expiration: expiration.to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

fn load(artifact_bytes: &[u8]) -> AegisResult<SealedArtifact> {
    let artifact = decode(artifact_bytes)?;
    if artifact.format == ArtifactFormat::Legacy {
        return Err(AegisError::UnsupportedFormat(
            "legacy artifacts carry no license data and cannot be run; use `aegis decrypt`"
                .to_string(),
        ));
    }
    Ok(artifact)
}

fn check_integrity(artifact: &SealedArtifact) -> AegisResult<()> {
    let expected = artifact
        .guard
        .as_ref()
        .map(|guard| guard.integrity_hash.as_str())
        .ok_or(AegisError::TamperedArtifact)?;

    if crypto::integrity_digest(&artifact.ciphertext_hex) != expected {
        return Err(AegisError::TamperedArtifact);
    }
    Ok(())
}
