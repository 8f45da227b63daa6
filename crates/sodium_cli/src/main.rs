//! Sodium operator tools.
//!
//! One-shot maintenance commands that work on a backend directly, without
//! going through a running panel's collection cache:
//!
//! - `backup` - write a redacted, timestamped JSON snapshot with retention
//! - `export-json` - write a redacted snapshot to a file or stdout
//! - `export-pterodactyl` - emit INSERT statements for a Pterodactyl
//!   schema; this direction only, there is no importer from a Pterodactyl
//!   database
//! - `import-json` - restore a snapshot into the container file
//! - `migrate` - move the whole dataset between backends
//!
//! Running these against a container a live panel process is also writing
//! is unsafe: the panel's next full rewrite wins. Stop the panel first.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Sodium database maintenance tools.
#[derive(Parser)]
#[command(name = "sodiumctl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Data directory holding sodium.db and config.json
    #[arg(global = true, long, default_value = "data")]
    data_dir: PathBuf,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a timestamped backup snapshot, pruning old ones
    Backup {
        /// Backup directory
        #[arg(long, default_value = ".backup")]
        dir: PathBuf,

        /// Number of backups to keep
        #[arg(long, default_value = "30")]
        keep: usize,

        /// Suppress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Export all data as a redacted JSON snapshot
    ExportJson {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print the JSON
        #[arg(short, long)]
        pretty: bool,
    },

    /// Export data as SQL INSERT statements for a Pterodactyl database
    ExportPterodactyl {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import a JSON snapshot, overwriting the container file
    ImportJson {
        /// Input snapshot file
        input: PathBuf,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Migrate the full dataset between backends
    Migrate {
        /// Source backend (file, mysql, postgres, sqlite)
        #[arg(long)]
        from: String,

        /// Target backend (file, mysql, postgres, sqlite)
        #[arg(long)]
        to: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Backup { dir, keep, quiet } => {
            commands::backup::run(&cli.data_dir, &dir, keep, quiet)?;
        }
        Commands::ExportJson { output, pretty } => {
            commands::export_json::run(&cli.data_dir, output.as_deref(), pretty)?;
        }
        Commands::ExportPterodactyl { output } => {
            commands::export_pterodactyl::run(&cli.data_dir, output.as_deref())?;
        }
        Commands::ImportJson { input, yes } => {
            commands::import_json::run(&cli.data_dir, &input, yes)?;
        }
        Commands::Migrate { from, to, yes } => {
            commands::migrate::run(&cli.data_dir, &from, &to, yes).await?;
        }
    }

    Ok(())
}
