//! Project settings for Aegis
//!
//! `aegis.json` holds the project secret and the expiration date stamped
//! into every artifact sealed in the project. The secret is stored in
//! cleartext next to the project.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::paths::ProjectPaths;
use crate::error::AegisError;

/// Expiration used when the project does not set one
pub const DEFAULT_EXPIRATION: &str = "9999-12-31";

/// Secret written by `aegis init --yes`
pub const DEFAULT_SECRET: &str = "default-secret-key";

/// Expiration is compared as text, so it must be exactly YYYY-MM-DD
pub fn validate_expiration(expiration: &str) -> Result<(), AegisError> {
    let valid = expiration.len() == 10
        && NaiveDate::parse_from_str(expiration, "%Y-%m-%d").is_ok();

    if valid {
        Ok(())
    } else {
        Err(AegisError::Config(format!(
            "Expiration must be a YYYY-MM-DD date, got {:?}",
            expiration
        )))
    }
}

/// Read-only view of the settings the sealing core consumes
pub trait SettingsSource {
    /// Project secret, if one is configured
    fn secret(&self) -> Option<&str>;

    /// Expiration date (`YYYY-MM-DD`) stamped into new artifacts
    fn expiration(&self) -> &str;
}

/// Contents of aegis.json
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSettings {
    /// Project name
    #[serde(default)]
    pub name: String,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Author shown to people running the artifacts
    #[serde(default)]
    pub author: String,

    /// Password used when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,

    /// License expiration date (YYYY-MM-DD)
    #[serde(default = "default_expiration")]
    pub expiration: String,

    /// When the project was initialized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_expiration() -> String {
    DEFAULT_EXPIRATION.to_string()
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            author: String::new(),
            secret: None,
            expiration: default_expiration(),
            created_at: None,
        }
    }
}

impl SettingsSource for ProjectSettings {
    fn secret(&self) -> Option<&str> {
        self.secret.as_deref().filter(|s| !s.is_empty())
    }

    fn expiration(&self) -> &str {
        if self.expiration.is_empty() {
            DEFAULT_EXPIRATION
        } else {
            &self.expiration
        }
    }
}

impl ProjectSettings {
    /// Load settings from disk, or fall back to defaults if the project has no aegis.json
    pub fn load_or_default(paths: &ProjectPaths) -> Result<Self, AegisError> {
        if paths.is_initialized() {
            Self::load(paths)
        } else {
            Ok(Self::default())
        }
    }

    /// Load settings from disk, failing if the file is missing
    pub fn load(paths: &ProjectPaths) -> Result<Self, AegisError> {
        let settings_path = paths.settings_file();

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| AegisError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| AegisError::Config(format!("Failed to parse settings file: {}", e)))
    }

    /// Save settings to disk
    pub fn save(&self, paths: &ProjectPaths) -> Result<(), AegisError> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| AegisError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| AegisError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}
