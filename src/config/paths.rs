//! Path management for Aegis
//!
//! Settings are scoped to a project directory.
//!
//! ## Path Resolution Order
//!
//! 1. `AEGIS_PROJECT_DIR` environment variable (if set)
//! 2. The current working directory

use std::path::{Path, PathBuf};

use crate::error::AegisError;

/// Environment variable overriding the project directory
pub const PROJECT_DIR_ENV: &str = "AEGIS_PROJECT_DIR";

/// Name of the project settings file
pub const SETTINGS_FILE_NAME: &str = "aegis.json";

/// Manages the paths of one Aegis project
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    project_dir: PathBuf,
}

impl ProjectPaths {
    /// Resolve the project directory from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined.
    pub fn new() -> Result<Self, AegisError> {
        let project_dir = match std::env::var_os(PROJECT_DIR_ENV) {
            Some(custom) => PathBuf::from(custom),
            None => std::env::current_dir().map_err(|e| {
                AegisError::Config(format!("Could not determine current directory: {}", e))
            })?,
        };

        Ok(Self { project_dir })
    }

    /// Create ProjectPaths for a specific directory (useful for testing)
    pub fn with_project_dir(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
        }
    }

    /// Get the project directory
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Get the path to aegis.json
    pub fn settings_file(&self) -> PathBuf {
        self.project_dir.join(SETTINGS_FILE_NAME)
    }

    /// Directory name, used as the default project name
    pub fn project_name(&self) -> String {
        self.project_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "aegis-project".to_string())
    }

    /// Check if the project has been initialized (settings file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_project_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ProjectPaths::with_project_dir(temp_dir.path());

        assert_eq!(paths.project_dir(), temp_dir.path());
        assert_eq!(paths.settings_file(), temp_dir.path().join("aegis.json"));
        assert!(!paths.is_initialized());
    }

    #[test]
    fn test_project_name_from_dir() {
        let paths = ProjectPaths::with_project_dir("/work/my-app");
        assert_eq!(paths.project_name(), "my-app");
    }

    #[test]
    fn test_is_initialized() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ProjectPaths::with_project_dir(temp_dir.path());
        std::fs::write(paths.settings_file(), "{}").unwrap();
        assert!(paths.is_initialized());
    }
}
