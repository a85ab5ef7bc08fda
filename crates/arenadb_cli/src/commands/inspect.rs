//! Inspect command implementation.

use super::{format_size, open_store, Format};
use arenadb_storage::{scan_frames, FrameKind, FrameScan, ReadScope, StorageResult, Store};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Database inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Journal path.
    pub path: String,
    /// Journal size in bytes.
    pub journal_size: u64,
    /// Number of valid journal frames.
    pub frames: usize,
    /// Number of snapshot frames among them.
    pub snapshot_frames: usize,
    /// Whether an interrupted commit was found at the end of the journal.
    pub torn_tail: bool,
    /// Per-namespace statistics, by name.
    pub namespaces: Vec<NamespaceStats>,
}

/// Statistics for a single namespace.
#[derive(Debug, Serialize)]
pub struct NamespaceStats {
    /// Namespace (table) name.
    pub name: String,
    /// Number of stored records.
    pub records: usize,
    /// Last identifier handed out.
    pub sequence: u64,
    /// Total size of stored values in bytes.
    pub data_size: usize,
}

/// Runs the inspect command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let format = Format::parse(format)?;
    if !path.exists() {
        return Err(format!("No database found at {}", path.display()).into());
    }

    // Scan before opening: opening cuts a torn tail off.
    let bytes = fs::read(path)?;
    let scan = scan_frames(&bytes)?;
    let store = open_store(path)?;
    let result = collect(path, bytes.len() as u64, &scan, &store)?;

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        Format::Text => print_text_output(&result),
    }
    Ok(())
}

/// Gathers statistics from a scanned journal and the store replayed from it.
pub fn collect(
    path: &Path,
    journal_size: u64,
    scan: &FrameScan,
    store: &Store,
) -> StorageResult<InspectResult> {
    let txn = store.begin_read()?;
    let mut namespaces = Vec::new();
    for name in txn.namespaces() {
        let data_size = txn
            .iter_ordered(&name)?
            .map(|(_, value)| value.len())
            .sum();
        namespaces.push(NamespaceStats {
            records: txn.len(&name)?,
            sequence: txn.sequence(&name)?,
            data_size,
            name,
        });
    }

    Ok(InspectResult {
        path: path.display().to_string(),
        journal_size,
        frames: scan.frames.len(),
        snapshot_frames: scan
            .frames
            .iter()
            .filter(|f| f.kind == FrameKind::Snapshot)
            .count(),
        torn_tail: scan.torn_tail,
        namespaces,
    })
}

fn print_text_output(result: &InspectResult) {
    println!("ArenaDB Database Inspection");
    println!("===========================");
    println!();
    println!("Path: {}", result.path);
    println!();
    println!("Journal:");
    println!("  Size:            {}", format_size(result.journal_size));
    println!("  Frames:          {}", result.frames);
    println!("  Snapshot frames: {}", result.snapshot_frames);
    if result.torn_tail {
        println!("  Torn tail:       yes (discarded on open)");
    }
    println!();
    println!("Namespaces:");
    if result.namespaces.is_empty() {
        println!("  (none)");
    }
    for ns in &result.namespaces {
        println!(
            "  {:<20} {:>8} records  sequence {:>6}  {}",
            ns.name,
            ns.records,
            ns.sequence,
            format_size(ns.data_size as u64)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arenadb_storage::WriteScope;

    #[test]
    fn collects_namespace_stats() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arena.db");
        {
            let store = Store::open(
                Box::new(arenadb_storage::FileJournal::open(&path).unwrap()),
                arenadb_storage::StoreOptions::default(),
            )
            .unwrap();
            store
                .update(|tx| {
                    tx.create_namespace_if_absent("Team")?;
                    tx.create_namespace_if_absent("Match")?;
                    for _ in 0..3 {
                        let id = tx.next_sequence("Team")?;
                        tx.put("Team", id.to_string().into_bytes(), vec![0; 10])?;
                    }
                    Ok::<_, arenadb_storage::StorageError>(())
                })
                .unwrap();
        }

        let bytes = fs::read(&path).unwrap();
        let scan = scan_frames(&bytes).unwrap();
        let store = open_store(&path).unwrap();
        let result = collect(&path, bytes.len() as u64, &scan, &store).unwrap();

        assert_eq!(result.frames, 1);
        assert!(!result.torn_tail);
        let names: Vec<&str> = result.namespaces.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Match", "Team"]);
        let team = &result.namespaces[1];
        assert_eq!(team.records, 3);
        assert_eq!(team.sequence, 3);
        assert_eq!(team.data_size, 30);
    }
}
