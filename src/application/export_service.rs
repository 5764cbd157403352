//! Export service for packing named sessions into an archive.
//!
//! Resolves aliases through the registry, locates each session's log file
//! in the session tree, and hands the result to the archive codec.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::domain::{AppConfig, AppError, ExportReport, Result};
use crate::infrastructure::{write_archive, PayloadSource, RegistryStore, SessionTree};

/// Service for exporting registry entries.
pub struct ExportService {
    store: RegistryStore,
    projects_dir: PathBuf,
    extension: String,
    source_machine: String,
}

impl ExportService {
    /// Create an export service from configuration, using the local host name.
    #[must_use]
    pub fn new(config: &AppConfig) -> Self {
        Self::with_parts(
            RegistryStore::new(config.registry_path()),
            config.projects_dir(),
            config.extension(),
            local_hostname(),
        )
    }

    /// Create with explicit collaborators.
    #[must_use]
    pub fn with_parts(
        store: RegistryStore,
        projects_dir: impl Into<PathBuf>,
        extension: impl Into<String>,
        source_machine: impl Into<String>,
    ) -> Self {
        Self {
            store,
            projects_dir: projects_dir.into(),
            extension: extension.into(),
            source_machine: source_machine.into(),
        }
    }

    /// Export a single alias.
    ///
    /// # Errors
    /// Returns `NotFound` if the alias is not registered and
    /// `SessionFileMissing` if its log file cannot be found or read.
    pub fn export_one(&self, alias: &str, destination: &Path) -> Result<ExportReport> {
        let session_id = self.store.get(alias)?;
        let missing = || AppError::SessionFileMissing {
            alias: alias.to_string(),
            session_id: session_id.clone(),
        };

        let tree = SessionTree::scan(&self.projects_dir, &self.extension)?;
        let path = tree.locate(&session_id).ok_or_else(missing)?;

        let sources = [PayloadSource {
            alias: alias.to_string(),
            session_id: session_id.clone(),
            path: path.to_path_buf(),
        }];

        let outcome = match self.write(destination, &sources) {
            Err(AppError::NothingToExport) => return Err(missing()),
            other => other?,
        };

        tracing::info!(alias, session_id = %session_id, path = %destination.display(), "Exported session");

        Ok(ExportReport {
            archive_path: destination.to_path_buf(),
            manifest: outcome.manifest,
            exported: outcome.written,
            skipped: Vec::new(),
        })
    }

    /// Export every registry entry whose log file can be found.
    ///
    /// Entries without a log file are skipped and listed in the report.
    ///
    /// # Errors
    /// Returns `EmptyRegistry` if nothing is registered and `NothingToExport`
    /// if no entry resolves to a readable log file.
    pub fn export_all(&self, destination: &Path) -> Result<ExportReport> {
        let registry = self.store.load()?;
        if registry.is_empty() {
            return Err(AppError::EmptyRegistry);
        }

        let tree = SessionTree::scan(&self.projects_dir, &self.extension)?;

        let mut sources = Vec::new();
        let mut skipped = Vec::new();
        for (alias, session_id) in registry.iter() {
            match tree.locate(session_id) {
                Some(path) => sources.push(PayloadSource {
                    alias: alias.to_string(),
                    session_id: session_id.to_string(),
                    path: path.to_path_buf(),
                }),
                None => {
                    tracing::info!(alias, session_id, "Session file not found, skipping");
                    skipped.push(alias.to_string());
                }
            }
        }

        if sources.is_empty() {
            return Err(AppError::NothingToExport);
        }

        let outcome = self.write(destination, &sources)?;
        skipped.extend(outcome.missing);

        tracing::info!(
            exported = outcome.written.len(),
            skipped = skipped.len(),
            path = %destination.display(),
            "Exported sessions"
        );

        Ok(ExportReport {
            archive_path: destination.to_path_buf(),
            manifest: outcome.manifest,
            exported: outcome.written,
            skipped,
        })
    }

    fn write(
        &self,
        destination: &Path,
        sources: &[PayloadSource],
    ) -> Result<crate::infrastructure::WriteOutcome> {
        write_archive(
            destination,
            &self.source_machine,
            Utc::now(),
            sources,
        )
    }
}

/// Host name recorded in exported manifests.
fn local_hostname() -> String {
    match hostname::get() {
        Ok(name) => name.to_string_lossy().into_owned(),
        Err(e) => {
            tracing::warn!(error = %e, "Could not determine host name");
            "unknown".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ArchiveReader;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    struct Fixture {
        dir: TempDir,
        service: ExportService,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempdir().unwrap();
            let store = RegistryStore::new(dir.path().join("session-names.json"));
            let service =
                ExportService::with_parts(store, dir.path().join("projects"), "jsonl", "laptop");
            Self { dir, service }
        }

        fn session(&self, project: &str, id: &str, content: &str) {
            let project_dir = self.dir.path().join("projects").join(project);
            fs::create_dir_all(&project_dir).unwrap();
            fs::write(project_dir.join(format!("{id}.jsonl")), content).unwrap();
        }

        fn out(&self) -> PathBuf {
            self.dir.path().join("out/export.zip")
        }
    }

    #[test]
    fn test_export_one() {
        let fx = Fixture::new();
        fx.session("-home-me-proj", "abc123", "{\"type\":\"user\"}\n");
        fx.service.store.set("work", "abc123").unwrap();

        let report = fx.service.export_one("work", &fx.out()).unwrap();

        assert_eq!(report.exported, vec!["work"]);
        assert!(report.skipped.is_empty());
        assert_eq!(report.manifest.sessions_count, 1);
        assert_eq!(report.manifest.source_machine, "laptop");

        let mut reader = ArchiveReader::open(&fx.out()).unwrap();
        assert_eq!(
            serde_json::to_value(reader.mappings()).unwrap(),
            serde_json::json!({"work": "abc123"})
        );
        assert_eq!(
            reader.read_payload("abc123").unwrap().unwrap(),
            b"{\"type\":\"user\"}\n"
        );
    }

    #[test]
    fn test_export_one_only_includes_that_alias() {
        let fx = Fixture::new();
        fx.session("p", "abc123", "a");
        fx.session("p", "def456", "b");
        fx.service.store.set("work", "abc123").unwrap();
        fx.service.store.set("home", "def456").unwrap();

        fx.service.export_one("home", &fx.out()).unwrap();

        let reader = ArchiveReader::open(&fx.out()).unwrap();
        assert_eq!(reader.mappings().len(), 1);
        assert_eq!(reader.mappings().get("home"), Some("def456"));
    }

    #[test]
    fn test_export_one_unknown_alias() {
        let fx = Fixture::new();
        let result = fx.service.export_one("nope", &fx.out());
        assert!(matches!(result, Err(AppError::NotFound { .. })));
        assert!(!fx.out().exists());
    }

    #[test]
    fn test_export_one_missing_session_file() {
        let fx = Fixture::new();
        fx.service.store.set("work", "abc123").unwrap();

        let result = fx.service.export_one("work", &fx.out());

        assert!(matches!(
            result,
            Err(AppError::SessionFileMissing { ref session_id, .. }) if session_id == "abc123"
        ));
        assert!(!fx.out().exists());
    }

    #[test]
    fn test_export_all_partial() {
        let fx = Fixture::new();
        fx.session("p1", "id-1", "one");
        fx.session("p2", "id-3", "three");
        fx.service.store.set("first", "id-1").unwrap();
        fx.service.store.set("second", "id-2").unwrap();
        fx.service.store.set("third", "id-3").unwrap();

        let report = fx.service.export_all(&fx.out()).unwrap();

        assert_eq!(report.exported, vec!["first", "third"]);
        assert_eq!(report.skipped, vec!["second"]);
        assert_eq!(report.manifest.sessions_count, 2);

        let mut reader = ArchiveReader::open(&fx.out()).unwrap();
        assert_eq!(reader.mappings().len(), 2);
        assert!(reader.read_payload("id-1").unwrap().is_some());
        assert!(reader.read_payload("id-2").unwrap().is_none());
        assert!(reader.read_payload("id-3").unwrap().is_some());
    }

    #[test]
    fn test_export_all_empty_registry() {
        let fx = Fixture::new();
        let result = fx.service.export_all(&fx.out());
        assert!(matches!(result, Err(AppError::EmptyRegistry)));
    }

    #[test]
    fn test_export_all_nothing_resolves() {
        let fx = Fixture::new();
        fx.service.store.set("a", "missing-1").unwrap();
        fx.service.store.set("b", "missing-2").unwrap();

        let result = fx.service.export_all(&fx.out());

        assert!(matches!(result, Err(AppError::NothingToExport)));
        assert!(!fx.out().exists());
    }
}
