//! Configuration module for Aegis
//!
//! This module provides configuration management including:
//! - Project directory resolution
//! - The aegis.json project settings (secret and expiration)

pub mod paths;
pub mod settings;

pub use paths::ProjectPaths;
pub use settings::{ProjectSettings, SettingsSource};
