//! Domain models for the session registry and its archives.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Archive format version written by this tool.
pub const MANIFEST_VERSION: &str = "1.0";

/// Alias → session identifier mapping.
///
/// Keys are unique and the last write for a key wins. Insertion order is kept
/// so the backing file and archive mappings list entries in the order they
/// were added.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionRegistry {
    entries: IndexMap<String, String>,
}

impl SessionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the identifier for an alias.
    #[must_use]
    pub fn get(&self, alias: &str) -> Option<&str> {
        self.entries.get(alias).map(String::as_str)
    }

    /// Insert or replace an alias. Returns the previous identifier, if any.
    pub fn set(&mut self, alias: impl Into<String>, session_id: impl Into<String>) -> Option<String> {
        self.entries.insert(alias.into(), session_id.into())
    }

    /// Remove an alias, keeping the order of the remaining entries.
    pub fn remove(&mut self, alias: &str) -> Option<String> {
        self.entries.shift_remove(alias)
    }

    #[must_use]
    pub fn contains(&self, alias: &str) -> bool {
        self.entries.contains_key(alias)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(alias, session_id)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<A: Into<String>, S: Into<String>> FromIterator<(A, S)> for SessionRegistry {
    fn from_iter<T: IntoIterator<Item = (A, S)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(alias, id)| (alias.into(), id.into()))
                .collect(),
        }
    }
}

/// Returns true if `session_id` can be used as a file stem.
///
/// Identifiers arriving from an archive are untrusted and end up in a path
/// under the import directory, so separators and dot segments are rejected.
#[must_use]
pub fn is_valid_session_id(session_id: &str) -> bool {
    !session_id.is_empty()
        && session_id != "."
        && session_id != ".."
        && !session_id.contains(['/', '\\', '\0'])
}

/// Archive metadata stored as `manifest.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveManifest {
    /// Archive format version.
    pub version: String,
    /// When the archive was written (serialized as RFC 3339 with `Z`).
    pub exported_at: DateTime<Utc>,
    /// Host name of the exporting machine.
    pub source_machine: String,
    /// Number of aliases in the mapping table.
    pub sessions_count: usize,
}

impl ArchiveManifest {
    /// Create a manifest for the current format version.
    #[must_use]
    pub fn new(
        exported_at: DateTime<Utc>,
        source_machine: impl Into<String>,
        sessions_count: usize,
    ) -> Self {
        Self {
            version: MANIFEST_VERSION.to_string(),
            exported_at,
            source_machine: source_machine.into(),
            sessions_count,
        }
    }

    /// Whether this manifest's major version can be read.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        let major = |v: &str| v.split('.').next().map(str::to_owned);
        major(&self.version) == major(MANIFEST_VERSION)
    }
}

/// Result of an export operation.
#[derive(Debug, Clone)]
pub struct ExportReport {
    /// Where the archive was written.
    pub archive_path: PathBuf,
    /// Manifest written into the archive.
    pub manifest: ArchiveManifest,
    /// Aliases included in the archive.
    pub exported: Vec<String>,
    /// Aliases left out because their session file could not be found or read.
    pub skipped: Vec<String>,
}

/// Result of an import operation.
#[derive(Debug, Clone)]
pub struct ImportReport {
    /// Manifest of the imported archive.
    pub manifest: ArchiveManifest,
    /// Aliases added or replaced in the registry.
    pub imported: Vec<String>,
    /// Aliases skipped because they already exist and overwrite was off.
    pub skipped_conflicts: Vec<String>,
    /// Aliases skipped because their payload was absent or unusable.
    pub skipped_missing: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_last_write_wins() {
        let mut registry = SessionRegistry::new();
        assert_eq!(registry.set("work", "abc123"), None);
        assert_eq!(registry.set("work", "def456"), Some("abc123".into()));
        assert_eq!(registry.get("work"), Some("def456"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_serializes_as_flat_object() {
        let registry: SessionRegistry = [("work", "abc123"), ("home", "def456")]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&registry).unwrap();
        assert_eq!(json, r#"{"work":"abc123","home":"def456"}"#);

        let parsed: SessionRegistry = serde_json::from_str(&json).unwrap();
        let order: Vec<_> = parsed.iter().map(|(alias, _)| alias).collect();
        assert_eq!(order, vec!["work", "home"]);
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut registry: SessionRegistry =
            [("a", "1"), ("b", "2"), ("c", "3")].into_iter().collect();
        registry.remove("b");
        let order: Vec<_> = registry.iter().map(|(alias, _)| alias).collect();
        assert_eq!(order, vec!["a", "c"]);
    }

    #[test]
    fn test_session_id_validation() {
        assert!(is_valid_session_id("4f1c0d2e-aaaa-bbbb-cccc-0123456789ab"));
        assert!(is_valid_session_id("abc123"));
        assert!(!is_valid_session_id(""));
        assert!(!is_valid_session_id(".."));
        assert!(!is_valid_session_id("../escape"));
        assert!(!is_valid_session_id("a\\b"));
    }

    #[test]
    fn test_manifest_timestamp_uses_z_suffix() {
        let at = DateTime::parse_from_rfc3339("2026-01-26T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let manifest = ArchiveManifest::new(at, "laptop", 2);
        let json = serde_json::to_value(&manifest).unwrap();
        assert_eq!(json["version"], "1.0");
        assert_eq!(json["exported_at"], "2026-01-26T10:00:00Z");
        assert_eq!(json["source_machine"], "laptop");
        assert_eq!(json["sessions_count"], 2);
    }

    #[test]
    fn test_manifest_version_support() {
        let mut manifest = ArchiveManifest::new(Utc::now(), "host", 0);
        assert!(manifest.is_supported());
        manifest.version = "1.3".into();
        assert!(manifest.is_supported());
        manifest.version = "2.0".into();
        assert!(!manifest.is_supported());
    }
}
