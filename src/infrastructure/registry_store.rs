//! JSON-file backed alias registry.
//!
//! The whole mapping is read on every operation and written back in full on
//! every mutation. Writes go through a temp file in the same directory and
//! are renamed into place, so readers never see a half-written registry.

use std::fs;
use std::path::{Path, PathBuf};

use super::atomic_file::write_atomic;
use crate::domain::{AppError, Result, SessionRegistry};

/// Registry repository bound to one backing file.
#[derive(Debug, Clone)]
pub struct RegistryStore {
    path: PathBuf,
}

impl RegistryStore {
    /// Create a store for the given backing file. Nothing is touched on disk.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the registry.
    ///
    /// A missing file is an empty registry. A file that cannot be parsed is
    /// also treated as empty, but a warning is logged and its bytes are copied
    /// to `<file>.corrupt` so the next save does not destroy them.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read.
    pub fn load(&self) -> Result<SessionRegistry> {
        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "Registry file absent, starting empty");
                return Ok(SessionRegistry::new());
            }
            Err(e) => {
                return Err(AppError::io(
                    format!("Failed to read registry {}", self.path.display()),
                    e,
                ))
            }
        };

        match serde_json::from_slice(&content) {
            Ok(registry) => Ok(registry),
            Err(e) => {
                let backup = self.corrupt_backup_path();
                match fs::write(&backup, &content) {
                    Ok(()) => tracing::warn!(
                        path = %self.path.display(),
                        backup = %backup.display(),
                        error = %e,
                        "Registry file is unreadable, treating it as empty"
                    ),
                    Err(copy_err) => tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        backup_error = %copy_err,
                        "Registry file is unreadable and could not be backed up, treating it as empty"
                    ),
                }
                Ok(SessionRegistry::new())
            }
        }
    }

    /// Persist the full registry, creating parent directories as needed.
    ///
    /// An existing file keeps its permissions.
    ///
    /// # Errors
    /// Returns error if the directory, temp file, or rename fails.
    pub fn save(&self, registry: &SessionRegistry) -> Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)
            .map_err(|e| AppError::io("Failed to create registry directory", e))?;

        let content = serde_json::to_string_pretty(registry).map_err(AppError::json_parse)?;
        write_atomic(&self.path, content.as_bytes())?;

        tracing::debug!(path = %self.path.display(), entries = registry.len(), "Registry saved");
        Ok(())
    }

    /// Get the session identifier for an alias.
    ///
    /// # Errors
    /// Returns `NotFound` if the alias is not registered.
    pub fn get(&self, alias: &str) -> Result<String> {
        self.load()?
            .get(alias)
            .map(str::to_owned)
            .ok_or_else(|| AppError::NotFound {
                alias: alias.to_string(),
            })
    }

    /// Insert or replace an alias.
    ///
    /// # Errors
    /// Returns error if the registry cannot be saved.
    pub fn set(&self, alias: &str, session_id: &str) -> Result<()> {
        let mut registry = self.load()?;
        if let Some(previous) = registry.set(alias, session_id) {
            tracing::info!(alias, previous = %previous, session_id, "Replacing alias");
        }
        self.save(&registry)
    }

    /// Remove an alias.
    ///
    /// # Errors
    /// Returns `NotFound` if the alias is not registered.
    pub fn delete(&self, alias: &str) -> Result<()> {
        let mut registry = self.load()?;
        if registry.remove(alias).is_none() {
            return Err(AppError::NotFound {
                alias: alias.to_string(),
            });
        }
        self.save(&registry)
    }

    /// Return the full mapping.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read.
    pub fn list(&self) -> Result<SessionRegistry> {
        self.load()
    }

    fn corrupt_backup_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".corrupt");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_set_then_get() {
        let dir = tempdir().unwrap();
        let store = RegistryStore::new(dir.path().join("session-names.json"));

        store.set("work", "abc123").unwrap();

        assert_eq!(store.get("work").unwrap(), "abc123");
        let on_disk: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(on_disk, serde_json::json!({"work": "abc123"}));
    }

    #[test]
    fn test_delete_then_get_not_found() {
        let dir = tempdir().unwrap();
        let store = RegistryStore::new(dir.path().join("session-names.json"));

        store.set("work", "abc123").unwrap();
        store.delete("work").unwrap();

        assert!(matches!(store.get("work"), Err(AppError::NotFound { .. })));
        assert!(matches!(store.delete("work"), Err(AppError::NotFound { .. })));
    }

    #[test]
    fn test_missing_file_is_empty_and_not_created() {
        let dir = tempdir().unwrap();
        let store = RegistryStore::new(dir.path().join("nested/session-names.json"));

        assert!(store.list().unwrap().is_empty());
        assert!(!store.path().exists());

        store.set("a", "1").unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_corrupt_file_is_empty_and_backed_up() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session-names.json");
        fs::write(&path, "{not json").unwrap();
        let store = RegistryStore::new(&path);

        assert!(store.list().unwrap().is_empty());

        let backup = dir.path().join("session-names.json.corrupt");
        assert_eq!(fs::read_to_string(backup).unwrap(), "{not json");

        // Saving replaces the corrupt file but the backup remains.
        store.set("work", "abc123").unwrap();
        assert_eq!(store.get("work").unwrap(), "abc123");
    }

    #[cfg(unix)]
    #[test]
    fn test_save_keeps_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let store = RegistryStore::new(dir.path().join("session-names.json"));
        store.set("a", "1").unwrap();
        fs::set_permissions(store.path(), fs::Permissions::from_mode(0o644)).unwrap();

        store.set("b", "2").unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let store = RegistryStore::new(dir.path().join("session-names.json"));

        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("session-names.json")]);
    }
}
