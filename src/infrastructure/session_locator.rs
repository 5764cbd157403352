//! Session log discovery.
//!
//! Session logs live at `<root>/<project>/<session_id>.<ext>`. The tree is
//! scanned once into a [`SessionTree`] snapshot; lookups are pure queries
//! over that snapshot, so tests can inject entries instead of touching disk.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::domain::{AppError, Result};

/// One session log found in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFile {
    /// File stem, i.e. the session identifier.
    pub session_id: String,
    /// Full path to the log file.
    pub path: PathBuf,
    /// Last modification time.
    pub modified: SystemTime,
}

/// Snapshot of all session logs under a root directory, in scan order.
#[derive(Debug, Clone, Default)]
pub struct SessionTree {
    files: Vec<SessionFile>,
}

impl SessionTree {
    /// Build a snapshot from already known entries.
    #[must_use]
    pub fn from_entries(files: Vec<SessionFile>) -> Self {
        Self { files }
    }

    /// Scan `root/*/*.<extension>`.
    ///
    /// A missing root gives an empty snapshot. Unreadable project directories
    /// are logged and skipped.
    ///
    /// # Errors
    /// Returns error if `root` exists but cannot be listed.
    pub fn scan(root: &Path, extension: &str) -> Result<Self> {
        if !root.is_dir() {
            tracing::debug!(root = %root.display(), "Session root does not exist");
            return Ok(Self::default());
        }

        let projects = std::fs::read_dir(root).map_err(|e| {
            AppError::io(format!("Failed to read session root {}", root.display()), e)
        })?;

        let mut files = Vec::new();
        for project in projects.filter_map(std::result::Result::ok) {
            let project_path = project.path();
            if !project_path.is_dir() {
                continue;
            }

            let entries = match std::fs::read_dir(&project_path) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(path = %project_path.display(), error = %e, "Failed to read project directory");
                    continue;
                }
            };

            for entry in entries.filter_map(std::result::Result::ok) {
                if let Some(file) = session_file(&entry.path(), extension) {
                    files.push(file);
                }
            }
        }

        tracing::debug!(root = %root.display(), count = files.len(), "Scanned session tree");
        Ok(Self::from_entries(files))
    }

    /// Find the log file for a session identifier. First match in scan order.
    #[must_use]
    pub fn locate(&self, session_id: &str) -> Option<&Path> {
        self.files
            .iter()
            .find(|f| f.session_id == session_id)
            .map(|f| f.path.as_path())
    }

    /// Identifier of the most recently modified session log.
    ///
    /// When timestamps tie, the later entry in scan order wins.
    #[must_use]
    pub fn most_recent(&self) -> Option<&str> {
        self.files
            .iter()
            .max_by_key(|f| f.modified)
            .map(|f| f.session_id.as_str())
    }
}

/// Build a `SessionFile` if `path` is a regular file with the right extension.
fn session_file(path: &Path, extension: &str) -> Option<SessionFile> {
    if path.extension().and_then(|e| e.to_str()) != Some(extension) {
        return None;
    }
    let metadata = std::fs::metadata(path).ok()?;
    if !metadata.is_file() {
        return None;
    }
    let session_id = path.file_stem()?.to_str()?.to_string();
    let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

    Some(SessionFile {
        session_id,
        path: path.to_path_buf(),
        modified,
    })
}
