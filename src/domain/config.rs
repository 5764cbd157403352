//! Application configuration.
//!
//! Contains the path layout of the registry file and the session tree,
//! with defaults that match where agent sessions live on disk.

use std::ffi::OsString;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Environment variable overriding the registry file path.
pub const REGISTRY_PATH_ENV: &str = "SESSION_DB_PATH";

/// Path configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    /// Registry backing file (defaults to `~/.claude/session-names.json`).
    #[serde(default)]
    pub registry_file: Option<PathBuf>,

    /// Root of the session tree (defaults to `~/.claude/projects`).
    #[serde(default)]
    pub projects_dir: Option<PathBuf>,
}

/// Naming conventions of session files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Extension of session log files, without the dot.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Project subdirectory that receives imported sessions.
    #[serde(default = "default_import_dir_name")]
    pub import_dir_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            import_dir_name: default_import_dir_name(),
        }
    }
}

fn default_extension() -> String {
    "jsonl".to_string()
}

fn default_import_dir_name() -> String {
    "-imported-sessions-".to_string()
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Path configuration.
    #[serde(default)]
    pub paths: PathConfig,

    /// Session file naming.
    #[serde(default)]
    pub sessions: SessionConfig,

    /// Registry path taken from the environment; wins over `paths`.
    #[serde(skip)]
    registry_override: Option<PathBuf>,
}

impl AppConfig {
    /// Apply the `SESSION_DB_PATH` override from the process environment.
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_registry_override(std::env::var_os(REGISTRY_PATH_ENV))
    }

    /// Apply a registry path override. Empty values are ignored.
    #[must_use]
    pub fn with_registry_override(mut self, value: Option<OsString>) -> Self {
        self.registry_override = value.filter(|v| !v.is_empty()).map(PathBuf::from);
        self
    }

    /// Get the default base directory (`~/.claude`).
    #[must_use]
    pub fn default_base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".claude")
    }

    /// Get the default config file path.
    #[must_use]
    pub fn default_config_file() -> PathBuf {
        Self::default_base_dir().join("session-stash.toml")
    }

    /// Get the registry file path, honouring the environment override.
    #[must_use]
    pub fn registry_path(&self) -> PathBuf {
        self.registry_override
            .clone()
            .or_else(|| self.paths.registry_file.clone())
            .unwrap_or_else(|| Self::default_base_dir().join("session-names.json"))
    }

    /// Get the session tree root.
    #[must_use]
    pub fn projects_dir(&self) -> PathBuf {
        self.paths
            .projects_dir
            .clone()
            .unwrap_or_else(|| Self::default_base_dir().join("projects"))
    }

    /// Get the directory imported sessions are written to.
    #[must_use]
    pub fn import_dir(&self) -> PathBuf {
        self.projects_dir().join(&self.sessions.import_dir_name)
    }

    /// Session file extension.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.sessions.extension
    }
}
