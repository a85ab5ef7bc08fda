//! Compact command implementation.

use super::{format_size, open_store};
use arenadb_storage::{CompactionStats, MemoryJournal, Store, StoreOptions};
use std::fs;
use std::path::Path;

/// Runs the compact command.
pub fn run(path: &Path, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("Journal not found at {}", path.display()).into());
    }

    println!("Compacting journal at {}", path.display());
    if dry_run {
        println!("(dry run - no changes will be made)");
    }
    println!();

    let stats = if dry_run {
        preview(&fs::read(path)?)?
    } else {
        open_store(path)?.compact()?
    };

    println!("  Size before: {}", format_size(stats.before));
    println!("  Size after:  {}", format_size(stats.after));
    let saved = stats.before.saturating_sub(stats.after);
    println!(
        "  Space saved: {} ({:.1}%)",
        format_size(saved),
        if stats.before > 0 {
            saved as f64 / stats.before as f64 * 100.0
        } else {
            0.0
        }
    );
    if !dry_run {
        println!();
        println!("✓ Compaction complete");
    }
    Ok(())
}

/// Compacts an in-memory copy of the journal and reports the sizes.
pub fn preview(bytes: &[u8]) -> Result<CompactionStats, arenadb_storage::StorageError> {
    let store = Store::open(
        Box::new(MemoryJournal::with_data(bytes.to_vec())),
        StoreOptions::default(),
    )?;
    store.compact()
}

#[cfg(test)]
mod tests {
    use super::*;
    use arenadb_storage::{ReadScope, WriteScope};

    #[test]
    fn dry_run_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arena.db");
        {
            let store = Store::open(
                Box::new(arenadb_storage::FileJournal::open(&path).unwrap()),
                StoreOptions::default(),
            )
            .unwrap();
            store
                .update(|tx| tx.create_namespace_if_absent("Team"))
                .unwrap();
            for round in 0..10u8 {
                store
                    .update(|tx| tx.put("Team", b"1".to_vec(), vec![round; 64]))
                    .unwrap();
            }
        }

        let before = fs::read(&path).unwrap();
        let stats = preview(&before).unwrap();
        assert_eq!(stats.before, before.len() as u64);
        assert!(stats.after < stats.before);
        assert_eq!(fs::read(&path).unwrap(), before);

        let store = open_store(&path).unwrap();
        let real = store.compact().unwrap();
        assert_eq!(real.after, stats.after);
        let count = store.view(|tx| tx.len("Team")).unwrap();
        assert_eq!(count, 1);
    }
}
