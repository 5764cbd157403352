//! CLI interface using clap.
//!
//! Provides command-line arguments and subcommands for the tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::application::OutputFormat;

/// Session Stash - name agent sessions and move them between machines.
///
/// Environment: SESSION_DB_PATH overrides the registry file
/// (default: ~/.claude/session-names.json).
#[derive(Parser, Debug)]
#[command(name = "session-stash")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Push (save) a session under a name.
    #[command(visible_alias = "save")]
    Push {
        /// Name to attach to the session.
        name: String,

        /// Session ID.
        session_id: String,
    },

    /// Print the session ID saved under a name.
    Get {
        /// Saved name.
        name: String,
    },

    /// Drop (delete) a saved name.
    #[command(visible_alias = "delete")]
    Drop {
        /// Saved name.
        name: String,
    },

    /// List all saved sessions.
    List {
        /// Output format: json or table.
        #[arg(short, long, default_value = "json")]
        format: String,
    },

    /// Print the ID of the most recently modified session.
    Current,

    /// Export a single session to a zip file.
    Export {
        /// Saved name to export.
        name: String,

        /// Output zip path.
        path: PathBuf,
    },

    /// Export all saved sessions to a zip file.
    ExportAll {
        /// Output zip path.
        path: PathBuf,
    },

    /// Import sessions from a zip file.
    Import {
        /// Zip file produced by export or export-all.
        path: PathBuf,

        /// Replace sessions whose name already exists.
        #[arg(long)]
        overwrite: bool,
    },

    /// Show the manifest and names inside a zip file without importing.
    Inspect {
        /// Zip file produced by export or export-all.
        path: PathBuf,
    },

    /// Show the paths being used.
    Paths,

    /// Write a default configuration file if none exists.
    InitConfig,
}

impl Commands {
    /// Parse the output format argument of `list`.
    pub fn output_format(&self) -> Result<OutputFormat, String> {
        match self {
            Self::List { format } => format.parse(),
            _ => Ok(OutputFormat::default()),
        }
    }
}
