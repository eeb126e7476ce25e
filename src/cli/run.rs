//! `aegis run`: execute an artifact through the runtime guard
//!
//! Unlike encrypt/decrypt, gate failures end the process with a nonzero
//! status.

use std::path::PathBuf;

use clap::Args;

use crate::crypto::SecureString;
use crate::error::{AegisError, AegisResult};
use crate::guard::{
    FileSink, InterpreterSink, Materializer, PasswordSource, PromptPassword, RuntimeGuard,
    StaticPassword, StdoutSink,
};
use crate::storage::{FileStore, LocalFileStore};

/// Arguments of `aegis run`
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Artifact to run
    pub artifact: PathBuf,

    /// Write the unlocked payload to this file instead of stdout
    #[arg(short, long, conflicts_with = "interpreter")]
    pub output: Option<PathBuf>,

    /// Pipe the unlocked payload into this program (e.g. node, python3)
    #[arg(short, long)]
    pub interpreter: Option<String>,

    /// License code; prompted for when omitted
    #[arg(short, long, env = "AEGIS_LICENSE_CODE", hide_env_values = true)]
    pub password: Option<String>,

    /// Extra arguments passed to the interpreter
    #[arg(last = true)]
    pub interpreter_args: Vec<String>,
}

/// Handle `aegis run`, returning the process exit status
pub fn handle_run_command(args: RunArgs) -> i32 {
    match run(args) {
        Ok(status) => status,
        Err(e) => {
            report_failure(&e);
            e.exit_code()
        }
    }
}

fn run(args: RunArgs) -> AegisResult<i32> {
    let bytes = LocalFileStore.read(&args.artifact)?;

    let mut passwords: Box<dyn PasswordSource> = match args.password {
        Some(password) => Box::new(StaticPassword(SecureString::new(password))),
        None => Box::new(PromptPassword),
    };

    let mut sink: Box<dyn Materializer> = match (args.output, args.interpreter) {
        (Some(path), _) => Box::new(FileSink { path }),
        (None, Some(program)) => Box::new(InterpreterSink {
            program,
            args: args.interpreter_args,
        }),
        (None, None) => Box::new(StdoutSink),
    };

    RuntimeGuard::for_today().run(&bytes, passwords.as_mut(), sink.as_mut())
}

fn report_failure(err: &AegisError) {
    eprintln!();
    match err {
        AegisError::LicenseExpired { .. } => eprintln!("LICENSE EXPIRED"),
        _ if err.is_gate_failure() => eprintln!("ACCESS BLOCKED"),
        _ => {}
    }
    eprintln!("Error: {}", err);
}
