//! Infrastructure layer - external adapters (filesystem, zip archives).
//!
//! This layer handles all I/O operations and external dependencies.

pub mod archive;
pub mod atomic_file;
pub mod config;
pub mod registry_store;
pub mod session_locator;

pub use archive::{write_archive, ArchiveReader, PayloadSource, WriteOutcome};
pub use atomic_file::write_atomic;
pub use config::{ensure_config_exists, load_config};
pub use registry_store::RegistryStore;
pub use session_locator::SessionTree;
