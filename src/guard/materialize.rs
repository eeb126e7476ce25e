//! Where an unlocked payload goes
//!
//! The guard hands the plaintext to a `Materializer`: printed to stdout,
//! written to a file, or piped into an interpreter so the recovered code runs
//! without ever touching the disk.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{AegisError, AegisResult};
use crate::storage::write_atomic;

/// Receives the plaintext once every gate has passed
pub trait Materializer {
    /// Materialize the payload, returning its exit status
    fn materialize(&mut self, plaintext: &[u8]) -> AegisResult<i32>;
}

/// Writes the payload to standard output
#[derive(Debug, Default)]
pub struct StdoutSink;

impl Materializer for StdoutSink {
    fn materialize(&mut self, plaintext: &[u8]) -> AegisResult<i32> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(plaintext)?;
        stdout.flush()?;
        Ok(0)
    }
}

/// Writes the payload to a file
#[derive(Debug)]
pub struct FileSink {
    pub path: PathBuf,
}

impl Materializer for FileSink {
    fn materialize(&mut self, plaintext: &[u8]) -> AegisResult<i32> {
        write_atomic(&self.path, plaintext)?;
        Ok(0)
    }
}

/// Pipes the payload into an interpreter's stdin and waits for it
#[derive(Debug)]
pub struct InterpreterSink {
    pub program: String,
    pub args: Vec<String>,
}

impl Materializer for InterpreterSink {
    fn materialize(&mut self, plaintext: &[u8]) -> AegisResult<i32> {
        debug!(program = %self.program, "spawning interpreter");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| AegisError::Io(format!("Failed to start {}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            // The interpreter may exit before reading everything
            if let Err(e) = stdin.write_all(plaintext) {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(AegisError::Io(format!(
                        "Failed to pipe payload into {}: {}",
                        self.program, e
                    )));
                }
            }
        }

        let status = child
            .wait()
            .map_err(|e| AegisError::Io(format!("Failed to wait for {}: {}", self.program, e)))?;

        // Killed by a signal
        Ok(status.code().unwrap_or(1))
    }
}

/// Collects the payload in memory
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemorySink {
    pub output: Vec<u8>,
}

#[cfg(test)]
impl Materializer for MemorySink {
    fn materialize(&mut self, plaintext: &[u8]) -> AegisResult<i32> {
        self.output.extend_from_slice(plaintext);
        Ok(0)
    }
}
