//! Domain layer - core types for the session registry.
//!
//! This layer contains pure domain models, configuration and error types
//! without any I/O.

pub mod config;
pub mod error;
pub mod models;

pub use config::AppConfig;
pub use error::{AppError, Result};
pub use models::{
    is_valid_session_id, ArchiveManifest, ExportReport, ImportReport, SessionRegistry,
};
