//! Write-then-rename file replacement.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::domain::{AppError, Result};

/// Replace `path` with `content` via a temp file in the same directory.
///
/// The parent directory must exist. When `path` already exists its
/// permissions are carried over to the new file; a new file keeps the
/// temp file's owner-only mode.
///
/// # Errors
/// Returns error if the temp file cannot be created or written, or the
/// rename fails.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| {
        AppError::io(
            format!("Failed to create temporary file in {}", parent.display()),
            e,
        )
    })?;
    tmp.write_all(content)
        .map_err(|e| AppError::io(format!("Failed to write {}", path.display()), e))?;

    if let Ok(existing) = fs::metadata(path) {
        tmp.as_file()
            .set_permissions(existing.permissions())
            .map_err(|e| {
                AppError::io(format!("Failed to copy permissions of {}", path.display()), e)
            })?;
    }

    tmp.persist(path)
        .map_err(|e| AppError::io(format!("Failed to replace {}", path.display()), e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_creates_and_replaces() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("file.json");

        write_atomic(&path, b"one").unwrap();
        write_atomic(&path, b"two").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"two");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_replace_keeps_existing_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("file.json");
        fs::write(&path, b"old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        write_atomic(&path, b"new").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }
}
