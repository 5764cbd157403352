//! Zip archive codec for exported sessions.
//!
//! An archive holds three parts:
//! - `manifest.json`: format version, export time, origin host, session count
//! - `mappings.json`: flat alias → session identifier object
//! - `sessions/<session_id>.jsonl`: raw session log bytes
//!
//! Payload names are part of the format and do not follow the local
//! `sessions.extension` setting.

use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::domain::{AppError, ArchiveManifest, Result, SessionRegistry};

/// Name of the manifest entry.
pub const MANIFEST_ENTRY: &str = "manifest.json";
/// Name of the mapping table entry.
pub const MAPPINGS_ENTRY: &str = "mappings.json";
/// Directory holding payload entries.
pub const SESSIONS_DIR: &str = "sessions";
/// Suffix of payload entries.
pub const PAYLOAD_EXTENSION: &str = "jsonl";

/// Archive entry name for a session payload.
#[must_use]
pub fn payload_entry_name(session_id: &str) -> String {
    format!("{SESSIONS_DIR}/{session_id}.{PAYLOAD_EXTENSION}")
}

/// A registry entry together with the log file to pack for it.
#[derive(Debug, Clone)]
pub struct PayloadSource {
    pub alias: String,
    pub session_id: String,
    pub path: PathBuf,
}

/// What actually went into a written archive.
#[derive(Debug, Clone)]
pub struct WriteOutcome {
    /// Manifest as written.
    pub manifest: ArchiveManifest,
    /// Aliases present in the mapping table.
    pub written: Vec<String>,
    /// Aliases dropped because their log file could not be read.
    pub missing: Vec<String>,
}

/// Write an archive to `destination`.
///
/// Every payload is buffered first. Sources whose file cannot be read are
/// left out of both the mapping table and the payload set and reported in
/// [`WriteOutcome::missing`]. The archive is assembled in a temp file next to
/// `destination` and renamed over it once complete.
///
/// # Errors
/// Returns `NothingToExport` if no source could be read (nothing is created),
/// or an IO/archive error if the destination cannot be written.
pub fn write_archive(
    destination: &Path,
    source_machine: &str,
    exported_at: DateTime<Utc>,
    sources: &[PayloadSource],
) -> Result<WriteOutcome> {
    let mut mappings = SessionRegistry::new();
    let mut payloads: Vec<(&str, Vec<u8>)> = Vec::new();
    let mut unreadable: HashSet<&str> = HashSet::new();
    let mut missing = Vec::new();

    for source in sources {
        let already_loaded = payloads.iter().any(|(id, _)| *id == source.session_id);
        if !already_loaded && !unreadable.contains(source.session_id.as_str()) {
            match std::fs::read(&source.path) {
                Ok(bytes) => payloads.push((source.session_id.as_str(), bytes)),
                Err(e) => {
                    tracing::info!(
                        alias = %source.alias,
                        path = %source.path.display(),
                        error = %e,
                        "Session file unreadable, leaving it out of the archive"
                    );
                    unreadable.insert(source.session_id.as_str());
                }
            }
        }

        if unreadable.contains(source.session_id.as_str()) {
            missing.push(source.alias.clone());
        } else {
            mappings.set(source.alias.clone(), source.session_id.clone());
        }
    }

    if mappings.is_empty() {
        return Err(AppError::NothingToExport);
    }

    let manifest = ArchiveManifest::new(exported_at, source_machine, mappings.len());

    let parent = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| {
        AppError::io(format!("Failed to create directory {}", parent.display()), e)
    })?;
    let tmp = NamedTempFile::new_in(parent)
        .map_err(|e| AppError::io("Failed to create temporary archive", e))?;

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(tmp);

    write_json_entry(&mut zip, MANIFEST_ENTRY, &manifest, options)?;
    write_json_entry(&mut zip, MAPPINGS_ENTRY, &mappings, options)?;
    for (session_id, bytes) in &payloads {
        let name = payload_entry_name(session_id);
        zip.start_file(name.as_str(), options)
            .map_err(|e| AppError::archive(format!("Failed to add {name}"), e))?;
        zip.write_all(bytes)
            .map_err(|e| AppError::io(format!("Failed to write {name}"), e))?;
    }

    let tmp = zip
        .finish()
        .map_err(|e| AppError::archive("Failed to finalize archive", e))?;
    tmp.persist(destination).map_err(|e| {
        AppError::io(
            format!("Failed to create {}", destination.display()),
            e.error,
        )
    })?;

    tracing::info!(
        path = %destination.display(),
        sessions = manifest.sessions_count,
        payloads = payloads.len(),
        "Archive written"
    );

    Ok(WriteOutcome {
        manifest,
        written: mappings.iter().map(|(alias, _)| alias.to_string()).collect(),
        missing,
    })
}

fn write_json_entry<W, T>(
    zip: &mut ZipWriter<W>,
    name: &str,
    value: &T,
    options: SimpleFileOptions,
) -> Result<()>
where
    W: Write + std::io::Seek,
    T: serde::Serialize,
{
    let content = serde_json::to_string_pretty(value).map_err(AppError::json_parse)?;
    zip.start_file(name, options)
        .map_err(|e| AppError::archive(format!("Failed to add {name}"), e))?;
    zip.write_all(content.as_bytes())
        .map_err(|e| AppError::io(format!("Failed to write {name}"), e))
}

/// An opened, validated archive.
///
/// Manifest and mappings are parsed on open; payloads are read on demand.
pub struct ArchiveReader {
    archive: ZipArchive<File>,
    manifest: ArchiveManifest,
    mappings: SessionRegistry,
}

impl ArchiveReader {
    /// Open and validate an archive.
    ///
    /// # Errors
    /// Returns `FileNotFound` if `source` does not exist, and
    /// `InvalidArchive` if it cannot be opened or is not a zip file, if `manifest.json` or
    /// `mappings.json` is missing or malformed, or if the format version is
    /// not supported.
    pub fn open(source: &Path) -> Result<Self> {
        if !source.exists() {
            return Err(AppError::FileNotFound {
                path: source.to_path_buf(),
            });
        }

        let file = File::open(source).map_err(|e| {
            tracing::debug!(path = %source.display(), error = %e, "Cannot open archive");
            AppError::invalid_archive(format!("cannot open {}: {e}", source.display()))
        })?;
        let mut archive = ZipArchive::new(file).map_err(|e| {
            tracing::debug!(path = %source.display(), error = %e, "Not a zip container");
            AppError::invalid_archive(format!("invalid zip file: {}", source.display()))
        })?;

        let manifest: ArchiveManifest = read_json_entry(&mut archive, MANIFEST_ENTRY)?;
        if !manifest.is_supported() {
            return Err(AppError::invalid_archive(format!(
                "unsupported format version {}",
                manifest.version
            )));
        }
        let mappings: SessionRegistry = read_json_entry(&mut archive, MAPPINGS_ENTRY)?;

        tracing::debug!(
            path = %source.display(),
            source_machine = %manifest.source_machine,
            sessions = mappings.len(),
            "Archive opened"
        );

        Ok(Self {
            archive,
            manifest,
            mappings,
        })
    }

    #[must_use]
    pub const fn manifest(&self) -> &ArchiveManifest {
        &self.manifest
    }

    #[must_use]
    pub const fn mappings(&self) -> &SessionRegistry {
        &self.mappings
    }

    /// Read the payload for a session identifier, `None` if absent.
    ///
    /// # Errors
    /// Returns error if the entry exists but cannot be decompressed.
    pub fn read_payload(&mut self, session_id: &str) -> Result<Option<Vec<u8>>> {
        let name = payload_entry_name(session_id);
        let mut entry = match self.archive.by_name(&name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(AppError::archive(format!("Failed to open {name}"), e)),
        };

        let mut bytes = Vec::new();
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| AppError::io(format!("Failed to read {name}"), e))?;
        Ok(Some(bytes))
    }
}

fn read_json_entry<T: DeserializeOwned>(archive: &mut ZipArchive<File>, name: &str) -> Result<T> {
    let invalid = || AppError::invalid_archive(format!("missing or invalid {name}"));

    let mut entry = archive.by_name(name).map_err(|_| invalid())?;
    let mut content = Vec::new();
    entry.read_to_end(&mut content).map_err(|_| invalid())?;

    serde_json::from_slice(&content).map_err(|e| {
        tracing::debug!(entry = name, error = %e, "Malformed archive entry");
        invalid()
    })
}
