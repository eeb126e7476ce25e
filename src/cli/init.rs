//! Project setup CLI commands
//!
//! `aegis init` writes aegis.json; `aegis config` shows what the sealing
//! commands will use.

use std::io::{BufRead, Write};

use chrono::Utc;

use crate::config::settings::{validate_expiration, DEFAULT_EXPIRATION, DEFAULT_SECRET};
use crate::config::{ProjectPaths, ProjectSettings, SettingsSource};
use crate::error::{AegisError, AegisResult};

const DEFAULT_DESCRIPTION: &str = "Aegis project";
const DEFAULT_AUTHOR: &str = "User";

/// Handle `aegis init`
pub fn handle_init_command(paths: &ProjectPaths, yes: bool) -> AegisResult<()> {
    if paths.is_initialized() {
        return Err(AegisError::Config(format!(
            "{} already exists; edit it instead of re-running init",
            paths.settings_file().display()
        )));
    }

    let settings = if yes {
        default_settings(paths)
    } else {
        let stdin = std::io::stdin();
        prompt_settings(paths, &mut stdin.lock())?
    };

    settings.save(paths)?;

    println!("Aegis project initialized: {}", paths.settings_file().display());
    println!("  Expiration: {}", settings.expiration());
    println!();
    println!("The secret is stored in cleartext in aegis.json. Keep that file out of version control.");

    Ok(())
}

/// Handle `aegis config`
pub fn handle_config_command(paths: &ProjectPaths) -> AegisResult<()> {
    let settings = ProjectSettings::load_or_default(paths)?;

    println!("Aegis Configuration");
    println!("===================");
    println!("Project directory: {}", paths.project_dir().display());
    println!("Settings file:     {}", paths.settings_file().display());
    println!("Initialized:       {}", paths.is_initialized());
    println!();
    println!(
        "Secret:     {}",
        if settings.secret().is_some() { "configured" } else { "not set" }
    );
    println!("Expiration: {}", settings.expiration());

    Ok(())
}

fn default_settings(paths: &ProjectPaths) -> ProjectSettings {
    ProjectSettings {
        name: paths.project_name(),
        description: DEFAULT_DESCRIPTION.to_string(),
        author: DEFAULT_AUTHOR.to_string(),
        secret: Some(DEFAULT_SECRET.to_string()),
        expiration: DEFAULT_EXPIRATION.to_string(),
        created_at: Some(Utc::now()),
    }
}

/// Ask for each setting, keeping the default on an empty answer
fn prompt_settings(paths: &ProjectPaths, input: &mut impl BufRead) -> AegisResult<ProjectSettings> {
    let defaults = default_settings(paths);

    let name = prompt(input, "Project Name", &defaults.name)?;
    let description = prompt(input, "Description", &defaults.description)?;
    let author = prompt(input, "Author", &defaults.author)?;
    let secret = prompt(input, "License/Secret Key", DEFAULT_SECRET)?;
    let expiration = prompt(input, "Expiration Date (YYYY-MM-DD)", DEFAULT_EXPIRATION)?;
    validate_expiration(&expiration)?;

    Ok(ProjectSettings {
        name,
        description,
        author,
        secret: Some(secret),
        expiration,
        ..defaults
    })
}

fn prompt(input: &mut impl BufRead, label: &str, default: &str) -> AegisResult<String> {
    print!("{} ({}): ", label, default);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;

    let answer = answer.trim();
    Ok(if answer.is_empty() {
        default.to_string()
    } else {
        answer.to_string()
    })
}
