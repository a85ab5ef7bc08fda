//! Dump command implementation.

use super::{open_store, CliError, Format};
use arenadb_codec::Codec;
use arenadb_core::KeyEncoding;
use arenadb_storage::{ReadScope, Store};
use serde::Serialize;
use std::path::Path;

/// One dumped entry.
#[derive(Debug, Serialize)]
pub struct DumpEntry {
    /// Decoded identifier, if the key matches the key encoding.
    pub id: Option<i64>,
    /// Raw key in hex.
    pub key: String,
    /// Value decoded as a generic document, or the decoding error.
    pub value: serde_json::Value,
}

/// Runs the dump command.
pub fn run(
    path: &Path,
    namespace: &str,
    codec: Codec,
    keys: KeyEncoding,
    limit: Option<usize>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let format = Format::parse(format)?;
    let store = open_store(path)?;
    let entries = collect(&store, namespace, codec, keys, limit)?;

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        Format::Text => {
            for entry in &entries {
                let id = entry
                    .id
                    .map_or_else(|| format!("0x{}", entry.key), |id| id.to_string());
                println!("{id:>10}  {}", entry.value);
            }
            println!();
            println!("{} entries from {namespace}", entries.len());
        }
    }
    Ok(())
}

/// Reads up to `limit` entries of `namespace` in key order.
pub fn collect(
    store: &Store,
    namespace: &str,
    codec: Codec,
    keys: KeyEncoding,
    limit: Option<usize>,
) -> Result<Vec<DumpEntry>, Box<dyn std::error::Error>> {
    let txn = store.begin_read()?;
    if !txn.has_namespace(namespace) {
        return Err(CliError::UnknownNamespace(namespace.to_string()).into());
    }

    let entries = txn
        .iter_ordered(namespace)?
        .take(limit.unwrap_or(usize::MAX))
        .map(|(key, value)| DumpEntry {
            id: keys.decode(key),
            key: hex(key),
            value: codec
                .to_json_value(value)
                .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() })),
        })
        .collect();
    Ok(entries)
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
