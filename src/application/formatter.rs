//! Output formatting for registry listings and operation summaries.
//!
//! Supports JSON (the default, for scripting) and a table view.

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};

use crate::domain::{ArchiveManifest, ExportReport, ImportReport, SessionRegistry};

/// Output format options for listings.
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    /// Pretty-printed JSON object.
    #[default]
    Json,
    /// Compact table listing.
    Table,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "table" => Ok(Self::Table),
            _ => Err(format!("Unknown format: {s}. Use: json, table")),
        }
    }
}

/// Formats the registry as a pretty JSON object.
///
/// # Errors
/// Returns error if serialization fails.
pub fn format_registry_json(registry: &SessionRegistry) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(registry)
}

/// Formats the registry as a table.
pub fn format_registry_table(registry: &SessionRegistry) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Name", "Session ID"]);

    for (alias, session_id) in registry.iter() {
        table.add_row(vec![alias, session_id]);
    }

    table.to_string()
}

/// Formats an archive's manifest and mapping table.
pub fn format_archive_summary(manifest: &ArchiveManifest, mappings: &SessionRegistry) -> String {
    let mut out = format!(
        "{}\n  Version: {}\n  Exported at: {}\n  Source machine: {}\n  Sessions: {}\n",
        "📦 Archive".bold(),
        manifest.version,
        manifest.exported_at.format("%Y-%m-%d %H:%M:%S UTC"),
        manifest.source_machine.cyan(),
        manifest.sessions_count.to_string().cyan(),
    );
    out.push('\n');
    out.push_str(&format_registry_table(mappings));
    out
}

/// Formats the success line of an export.
pub fn format_export_summary(report: &ExportReport) -> String {
    match report.exported.as_slice() {
        [alias] if report.skipped.is_empty() => format!(
            "{} Exported '{}' to {}",
            "✓".green().bold(),
            alias,
            report.archive_path.display()
        ),
        exported => format!(
            "{} Exported {} session(s) to {}",
            "✓".green().bold(),
            exported.len(),
            report.archive_path.display()
        ),
    }
}

/// Formats the warning for aliases left out of an export, if any.
pub fn format_export_warning(report: &ExportReport) -> Option<String> {
    if report.skipped.is_empty() {
        return None;
    }
    Some(format!(
        "{} {} session(s) skipped (files not found): {}",
        "Warning:".yellow().bold(),
        report.skipped.len(),
        report.skipped.join(", ")
    ))
}

/// Formats the summary of an import.
pub fn format_import_summary(report: &ImportReport) -> String {
    let mut out = format!(
        "{} Imported {} session(s) from {}",
        "✓".green().bold(),
        report.imported.len(),
        report.manifest.source_machine
    );

    if !report.imported.is_empty() {
        out.push_str(&format!("\n  Imported: {}", report.imported.join(", ")));
    }
    if !report.skipped_conflicts.is_empty() {
        out.push_str(&format!(
            "\n  Skipped (already exists): {}\n  Use --overwrite to replace existing sessions",
            report.skipped_conflicts.join(", ")
        ));
    }
    if !report.skipped_missing.is_empty() {
        out.push_str(&format!(
            "\n  {} {}",
            "Skipped (session file missing in archive):".yellow(),
            report.skipped_missing.join(", ")
        ));
    }

    out
}
