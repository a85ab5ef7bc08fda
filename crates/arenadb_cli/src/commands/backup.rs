//! Backup command implementation.
//!
//! Opens the database through [`arenadb_core::Database`] so the copy is a
//! consistent snapshot taken under the journal lock.

use super::format_size;
use arenadb_core::{Config, Database};
use std::path::Path;
use tracing::info;

/// Writes a compacted copy of the database at `db_path` to `output_path`.
pub fn run(db_path: &Path, output_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    info!("Creating backup of {}", db_path.display());

    let db = Database::open_with_config(db_path, Config::new().create_if_missing(false))?;
    let written = db.backup_to(output_path)?;
    db.close()?;

    println!("✓ Backup created successfully");
    println!("  Path: {}", output_path.display());
    println!("  Size: {}", format_size(written));
    Ok(())
}
