//! Session Stash - name agent sessions and carry them between machines.
//!
//! Keeps a small registry mapping memorable names to opaque session IDs,
//! and packs named sessions (with their `.jsonl` logs) into zip archives
//! that can be imported elsewhere.
//!
//!   session-stash push work <session-id>    # Name a session
//!   session-stash get work                  # Print its ID
//!   session-stash current                   # ID of the latest session
//!   session-stash export work work.zip      # Pack one session
//!   session-stash export-all all.zip        # Pack every named session
//!   session-stash import all.zip            # Unpack on another machine

mod application;
mod cli;
mod domain;
mod infrastructure;

use std::path::Path;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use application::{
    format_archive_summary, format_export_summary, format_export_warning, format_import_summary,
    format_registry_json, format_registry_table, ExportService, ImportService, OutputFormat,
};
use cli::{Cli, Commands};
use domain::{AppConfig, AppError};
use infrastructure::{ensure_config_exists, load_config, ArchiveReader, RegistryStore, SessionTree};

fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Main application logic.
fn run(cli: Cli) -> domain::Result<()> {
    let format = cli
        .command
        .output_format()
        .map_err(|message| AppError::Config { message })?;
    let config = load_config()?;

    match cli.command {
        Commands::Push { name, session_id } => cmd_push(&config, &name, &session_id)?,
        Commands::Get { name } => cmd_get(&config, &name)?,
        Commands::Drop { name } => cmd_drop(&config, &name)?,
        Commands::List { .. } => cmd_list(&config, format)?,
        Commands::Current => cmd_current(&config)?,
        Commands::Export { name, path } => cmd_export(&config, &name, &path)?,
        Commands::ExportAll { path } => cmd_export_all(&config, &path)?,
        Commands::Import { path, overwrite } => cmd_import(&config, &path, overwrite)?,
        Commands::Inspect { path } => cmd_inspect(&path)?,
        Commands::Paths => cmd_paths(&config),
        Commands::InitConfig => cmd_init_config()?,
    }

    Ok(())
}

fn registry(config: &AppConfig) -> RegistryStore {
    RegistryStore::new(config.registry_path())
}

/// Save a name → session ID mapping.
fn cmd_push(config: &AppConfig, name: &str, session_id: &str) -> domain::Result<()> {
    registry(config).set(name, session_id)?;
    println!("{} Pushed: {} -> {}", "✓".green().bold(), name.cyan(), session_id);
    Ok(())
}

/// Print the session ID for a name.
fn cmd_get(config: &AppConfig, name: &str) -> domain::Result<()> {
    let session_id = registry(config).get(name)?;
    println!("{session_id}");
    Ok(())
}

/// Delete a saved name.
fn cmd_drop(config: &AppConfig, name: &str) -> domain::Result<()> {
    registry(config).delete(name)?;
    println!("{} Dropped: {}", "✓".green().bold(), name.cyan());
    Ok(())
}

/// List saved sessions.
fn cmd_list(config: &AppConfig, format: OutputFormat) -> domain::Result<()> {
    let sessions = registry(config).list()?;

    let output = match format {
        OutputFormat::Json => format_registry_json(&sessions).map_err(AppError::json_parse)?,
        OutputFormat::Table => format_registry_table(&sessions),
    };

    println!("{output}");
    Ok(())
}

/// Print the ID of the most recently modified session log.
fn cmd_current(config: &AppConfig) -> domain::Result<()> {
    let root = config.projects_dir();
    let tree = SessionTree::scan(&root, config.extension())?;

    let session_id = tree
        .most_recent()
        .ok_or_else(|| AppError::NoSessionFiles { path: root.clone() })?;

    println!("{session_id}");
    Ok(())
}

/// Export one named session.
fn cmd_export(config: &AppConfig, name: &str, path: &Path) -> domain::Result<()> {
    let report = ExportService::new(config).export_one(name, path)?;
    println!("{}", format_export_summary(&report));
    Ok(())
}

/// Export all named sessions; missing session files are reported, not fatal.
fn cmd_export_all(config: &AppConfig, path: &Path) -> domain::Result<()> {
    let report = ExportService::new(config).export_all(path)?;

    println!("{}", format_export_summary(&report));
    if let Some(warning) = format_export_warning(&report) {
        eprintln!("{warning}");
    }

    Ok(())
}

/// Import sessions from an archive.
fn cmd_import(config: &AppConfig, path: &Path, overwrite: bool) -> domain::Result<()> {
    let service = ImportService::new(config);
    let report = service.import(path, overwrite)?;

    println!("{}", format_import_summary(&report));
    if !report.imported.is_empty() {
        println!("  Session files: {}", service.import_dir().display());
    }

    Ok(())
}

/// Show what an archive contains.
fn cmd_inspect(path: &Path) -> domain::Result<()> {
    let reader = ArchiveReader::open(path)?;
    println!("{}", format_archive_summary(reader.manifest(), reader.mappings()));
    Ok(())
}

/// Show resolved paths.
fn cmd_paths(config: &AppConfig) {
    println!("{}", "📂 Session Stash Paths".bold());
    println!();
    println!("  Registry: {}", registry(config).path().display());
    println!("  Config:   {}", AppConfig::default_config_file().display());
    println!("  Projects: {}", config.projects_dir().display());
    println!("  Imports:  {}", config.import_dir().display());
}

/// Write the default config file.
fn cmd_init_config() -> domain::Result<()> {
    let path = AppConfig::default_config_file();

    if ensure_config_exists(&path)? {
        println!("{} Created {}", "✓".green().bold(), path.display());
    } else {
        println!("Config already exists: {}", path.display());
    }

    Ok(())
}

/// Setup tracing/logging based on verbosity level.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
