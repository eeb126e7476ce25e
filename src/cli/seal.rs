//! Encrypt/decrypt CLI commands
//!
//! These commands never fail the process: errors are reported to the
//! operator and the exit status stays zero. Only `aegis run` uses exit codes.

use std::path::Path;

use crate::artifact::{seal_file, unseal_file, ArtifactFormat, SealReport, UnsealReport};
use crate::config::{ProjectPaths, ProjectSettings};
use crate::error::AegisResult;
use crate::storage::LocalFileStore;

/// Handle `aegis encrypt <file>`
pub fn handle_encrypt_command(paths: &ProjectPaths, file: &Path, password: Option<&str>) {
    match encrypt(paths, file, password) {
        Ok(report) => print_seal_report(file, &report),
        Err(e) => eprintln!("Encryption error: {}", e),
    }
}

/// Handle `aegis decrypt <file>`
pub fn handle_decrypt_command(paths: &ProjectPaths, file: &Path, password: Option<&str>) {
    match decrypt(paths, file, password) {
        Ok(report) => print_unseal_report(&report),
        Err(e) => {
            eprintln!("Decryption error: {}", e);
            eprintln!("Ensure you are decrypting a valid aegis artifact.");
        }
    }
}

fn encrypt(paths: &ProjectPaths, file: &Path, password: Option<&str>) -> AegisResult<SealReport> {
    let settings = ProjectSettings::load_or_default(paths)?;
    seal_file(&LocalFileStore, &settings, file, password)
}

fn decrypt(paths: &ProjectPaths, file: &Path, password: Option<&str>) -> AegisResult<UnsealReport> {
    let settings = ProjectSettings::load_or_default(paths)?;
    unseal_file(&LocalFileStore, &settings, file, password)
}

fn print_seal_report(file: &Path, report: &SealReport) {
    println!("Encrypted: {}", report.artifact_path.display());
    println!("  Expiration: {}", report.expiration);

    match &report.removal_error {
        None => println!("Original file deleted: {}", file.display()),
        Some(reason) => eprintln!("Warning: could not delete original file: {}", reason),
    }
}

fn print_unseal_report(report: &UnsealReport) {
    match report.format {
        ArtifactFormat::Legacy => {
            println!("File decrypted (legacy): {}", report.output_path.display())
        }
        _ => println!("Decrypted: {}", report.output_path.display()),
    }
}
