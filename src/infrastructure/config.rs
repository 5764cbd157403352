//! Configuration file management.
//!
//! Handles loading the optional TOML configuration file and writing
//! a commented default.

use std::fs;
use std::path::Path;

use crate::domain::{AppConfig, AppError, Result};

/// Default configuration file content.
const DEFAULT_CONFIG: &str = r#"# session-stash configuration
# Auto-generated - edit as needed

[paths]
# Registry file mapping aliases to session IDs
# (the SESSION_DB_PATH environment variable takes precedence)
# Default: ~/.claude/session-names.json. Use an absolute path.
# registry_file = "/custom/path/session-names.json"

# Root directory holding one subdirectory per project
# Default: ~/.claude/projects. Use an absolute path.
# projects_dir = "/custom/path/projects"

[sessions]
# Extension of session log files
extension = "jsonl"

# Project directory that receives sessions imported from other machines
import_dir_name = "-imported-sessions-"
"#;

/// Load configuration from the default file, then apply the environment.
///
/// # Errors
/// Returns error if the file exists but cannot be read or parsed.
pub fn load_config() -> Result<AppConfig> {
    let config_path = AppConfig::default_config_file();

    let config = if config_path.exists() {
        load_config_from_file(&config_path)?
    } else {
        AppConfig::default()
    };

    Ok(config.with_env())
}

/// Load configuration from a specific file.
///
/// # Errors
/// Returns error if file cannot be read or parsed.
pub fn load_config_from_file(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read config file: {}", path.display()), e))?;

    toml::from_str(&content).map_err(|e| AppError::Config {
        message: format!("Failed to parse config file {}: {e}", path.display()),
    })
}

/// Create the default configuration file if it doesn't exist.
///
/// Returns true if a file was written.
///
/// # Errors
/// Returns error if file cannot be created.
pub fn ensure_config_exists(config_path: &Path) -> Result<bool> {
    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::io("Failed to create config directory", e))?;
    }

    fs::write(config_path, DEFAULT_CONFIG)
        .map_err(|e| AppError::io("Failed to create default config", e))?;

    tracing::info!(path = %config_path.display(), "Created default configuration");

    Ok(true)
}
