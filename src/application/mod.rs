//! Application layer - use cases and orchestration.
//!
//! This layer contains the export and import workflows and the
//! formatting of their results.

pub mod export_service;
pub mod formatter;
pub mod import_service;

pub use export_service::ExportService;
pub use formatter::{
    format_archive_summary, format_export_summary, format_export_warning, format_import_summary,
    format_registry_json, format_registry_table, OutputFormat,
};
pub use import_service::ImportService;
