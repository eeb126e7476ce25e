//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the sealing core.

pub mod init;
pub mod run;
pub mod seal;

pub use init::{handle_config_command, handle_init_command};
pub use run::{handle_run_command, RunArgs};
pub use seal::{handle_decrypt_command, handle_encrypt_command};
