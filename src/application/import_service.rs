//! Import service for merging an exported archive into the local registry.
//!
//! Import runs in two phases. Payloads are first staged into the shared
//! import directory; the registry is then updated in memory and committed
//! with a single atomic save. Until the commit, no alias from the archive is
//! visible in the registry.

use std::path::{Path, PathBuf};

use crate::domain::{is_valid_session_id, AppConfig, AppError, ImportReport, Result};
use crate::infrastructure::{write_atomic, ArchiveReader, RegistryStore};

/// Service for importing archives.
pub struct ImportService {
    store: RegistryStore,
    import_dir: PathBuf,
    extension: String,
}

impl ImportService {
    /// Create an import service from configuration.
    #[must_use]
    pub fn new(config: &AppConfig) -> Self {
        Self::with_parts(
            RegistryStore::new(config.registry_path()),
            config.import_dir(),
            config.extension(),
        )
    }

    /// Create with explicit collaborators.
    #[must_use]
    pub fn with_parts(
        store: RegistryStore,
        import_dir: impl Into<PathBuf>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            store,
            import_dir: import_dir.into(),
            extension: extension.into(),
        }
    }

    /// Directory imported payloads are written to.
    #[must_use]
    pub fn import_dir(&self) -> &Path {
        &self.import_dir
    }

    /// Import every mapping of an archive.
    ///
    /// Aliases that already exist are skipped unless `overwrite` is set.
    /// Entries whose payload is absent or unusable are skipped and listed in
    /// the report. Nothing is written anywhere unless the archive is valid.
    ///
    /// # Errors
    /// Returns `FileNotFound` or `InvalidArchive` if the archive cannot be
    /// used, or an error if the registry cannot be loaded or saved.
    pub fn import(&self, archive_path: &Path, overwrite: bool) -> Result<ImportReport> {
        let mut reader = ArchiveReader::open(archive_path)?;
        let manifest = reader.manifest().clone();
        let mappings = reader.mappings().clone();
        let mut registry = self.store.load()?;

        tracing::info!(
            path = %archive_path.display(),
            source_machine = %manifest.source_machine,
            exported_at = %manifest.exported_at,
            sessions = mappings.len(),
            overwrite,
            "Importing archive"
        );

        let mut staged = Vec::new();
        let mut skipped_conflicts = Vec::new();
        let mut skipped_missing = Vec::new();

        for (alias, session_id) in mappings.iter() {
            if registry.contains(alias) && !overwrite {
                tracing::info!(alias, "Alias already exists, skipping");
                skipped_conflicts.push(alias.to_string());
                continue;
            }

            if !is_valid_session_id(session_id) {
                tracing::info!(alias, session_id, "Unusable session ID in archive, skipping");
                skipped_missing.push(alias.to_string());
                continue;
            }

            let payload = match reader.read_payload(session_id) {
                Ok(Some(bytes)) => bytes,
                Ok(None) => {
                    tracing::info!(alias, session_id, "Session file not found in archive, skipping");
                    skipped_missing.push(alias.to_string());
                    continue;
                }
                Err(e) => {
                    tracing::info!(alias, session_id, error = %e, "Session file unreadable in archive, skipping");
                    skipped_missing.push(alias.to_string());
                    continue;
                }
            };

            match self.stage_payload(session_id, &payload) {
                Ok(path) => {
                    tracing::debug!(alias, path = %path.display(), "Staged session file");
                    staged.push((alias.to_string(), session_id.to_string()));
                }
                Err(e) => {
                    tracing::info!(alias, session_id, error = %e, "Failed to write session file, skipping");
                    skipped_missing.push(alias.to_string());
                }
            }
        }

        let mut imported = Vec::with_capacity(staged.len());
        for (alias, session_id) in staged {
            registry.set(alias.clone(), session_id);
            imported.push(alias);
        }

        if !imported.is_empty() {
            self.store.save(&registry)?;
        }

        tracing::info!(
            imported = imported.len(),
            conflicts = skipped_conflicts.len(),
            missing = skipped_missing.len(),
            "Import completed"
        );

        Ok(ImportReport {
            manifest,
            imported,
            skipped_conflicts,
            skipped_missing,
        })
    }

    /// Write one payload into the import directory, replacing any existing file.
    ///
    /// The file is named with the local session extension, whatever suffix
    /// the archive used.
    fn stage_payload(&self, session_id: &str, payload: &[u8]) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.import_dir).map_err(|e| {
            AppError::io(
                format!("Failed to create {}", self.import_dir.display()),
                e,
            )
        })?;

        let target = self
            .import_dir
            .join(format!("{session_id}.{}", self.extension));

        write_atomic(&target, payload)?;

        Ok(target)
    }
}
