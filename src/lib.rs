//! Aegis - seal files into password-protected, expiring artifacts
//!
//! Sealing encrypts a file with a password-derived key, writes a
//! self-describing artifact next to it and deletes the original. Unsealing
//! reverses it for both the current text artifacts and the legacy raw-byte
//! layout. Running an artifact goes through the runtime guard, which checks
//! expiration and integrity before asking for a license code.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Project paths and aegis.json settings
//! - `error`: Custom error types
//! - `crypto`: scrypt key derivation, AES-256-CBC, integrity digest
//! - `storage`: File-system handle with atomic writes
//! - `artifact`: Artifact encoding, format detection and decoding
//! - `guard`: Runtime guard state machine and payload materializers
//! - `cli`: Command handlers behind the `aegis` binary
//!
//! # Example
//!
//! ```rust,no_run
//! use aegis::artifact::{seal_file, unseal_file};
//! use aegis::config::{ProjectPaths, ProjectSettings};
//! use aegis::storage::LocalFileStore;
//! use std::path::Path;
//!
//! let paths = ProjectPaths::new()?;
//! let settings = ProjectSettings::load_or_default(&paths)?;
//!
//! let report = seal_file(&LocalFileStore, &settings, Path::new("app.js"), None)?;
//! unseal_file(&LocalFileStore, &settings, &report.artifact_path, None)?;
//! # Ok::<(), aegis::AegisError>(())
//! ```

pub mod artifact;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod error;
pub mod guard;
pub mod storage;

pub use error::{AegisError, AegisResult};
