//! ArenaDB CLI
//!
//! Command-line tools for ArenaDB journal files.
//!
//! # Commands
//!
//! - `inspect` - Display namespaces, record counts and sequences
//! - `dump` - Print the entries of one namespace
//! - `verify` - Checksum every journal frame
//! - `compact` - Rewrite the journal as a single snapshot
//! - `backup` - Write a compacted copy to another file

mod commands;

use arenadb_codec::Codec;
use arenadb_core::KeyEncoding;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// ArenaDB command-line database tools.
#[derive(Parser)]
#[command(name = "arenadb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the database journal file
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display namespaces, record counts and sequences
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print the entries of one namespace
    Dump {
        /// Namespace (table name) to dump
        #[arg(short, long)]
        namespace: String,

        /// Codec the values were written with (cbor, json)
        #[arg(short, long, default_value = "cbor")]
        codec: Codec,

        /// Key encoding the database uses (decimal, big-endian)
        #[arg(short, long, default_value = "decimal")]
        keys: KeyEncoding,

        /// Maximum number of entries to print
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Checksum every journal frame
    Verify {
        /// Also decode every stored value with this codec (cbor, json)
        #[arg(short, long)]
        decode: Option<Codec>,
    },

    /// Rewrite the journal as a single snapshot
    Compact {
        /// Dry run - show what would be done
        #[arg(short, long)]
        dry_run: bool,
    },

    /// Write a compacted copy of the database to another file
    Backup {
        /// Destination file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Inspect { format } => {
            let path = cli.path.ok_or("Database path required for inspect")?;
            commands::inspect::run(&path, &format)?;
        }
        Commands::Dump {
            namespace,
            codec,
            keys,
            limit,
            format,
        } => {
            let path = cli.path.ok_or("Database path required for dump")?;
            commands::dump::run(&path, &namespace, codec, keys, limit, &format)?;
        }
        Commands::Verify { decode } => {
            let path = cli.path.ok_or("Database path required for verify")?;
            commands::verify::run(&path, decode)?;
        }
        Commands::Compact { dry_run } => {
            let path = cli.path.ok_or("Database path required for compact")?;
            commands::compact::run(&path, dry_run)?;
        }
        Commands::Backup { output } => {
            let path = cli.path.ok_or("Database path required for backup")?;
            commands::backup::run(&path, &output)?;
        }
        Commands::Version => {
            println!("ArenaDB CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("ArenaDB Core v{}", arenadb_core::VERSION);
        }
    }

    Ok(())
}
