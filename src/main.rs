use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use aegis::cli::{
    handle_config_command, handle_decrypt_command, handle_encrypt_command, handle_init_command,
    handle_run_command, RunArgs,
};
use aegis::config::ProjectPaths;

#[derive(Parser)]
#[command(
    name = "aegis",
    version,
    about = "Seal files into password-protected, expiring artifacts",
    long_about = "Aegis encrypts a file into a self-describing artifact and deletes the \
                  original. Artifacts carry an integrity digest and a license expiration \
                  date, and can be run through `aegis run` once unlocked with a license code."
)]
struct Cli {
    /// Enable debug logging (overridden by AEGIS_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create aegis.json with the project secret and expiration
    Init {
        /// Accept all defaults without prompting
        #[arg(short, long)]
        yes: bool,
    },

    /// Seal a file into <file>.enc and delete the original
    Encrypt {
        /// File to seal
        file: PathBuf,
        /// Override the aegis.json secret
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Restore the original file from an artifact
    Decrypt {
        /// Artifact to unseal
        file: PathBuf,
        /// Override the aegis.json secret
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Run an artifact through the license guard
    Run(RunArgs),

    /// Show the project settings in effect
    Config,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("AEGIS_LOG").unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let paths = ProjectPaths::new()?;

    match cli.command {
        Commands::Init { yes } => handle_init_command(&paths, yes)?,
        Commands::Encrypt { file, password } => {
            handle_encrypt_command(&paths, &file, password.as_deref())
        }
        Commands::Decrypt { file, password } => {
            handle_decrypt_command(&paths, &file, password.as_deref())
        }
        // The guard owns its exit status
        Commands::Run(args) => std::process::exit(handle_run_command(args)),
        Commands::Config => handle_config_command(&paths)?,
    }

    Ok(())
}
