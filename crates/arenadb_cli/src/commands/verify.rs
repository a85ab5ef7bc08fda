//! Verify command implementation.

use super::CliError;
use arenadb_codec::Codec;
use arenadb_storage::{scan_frames, JournalOp, MemoryJournal, Store, StoreOptions};
use std::fs;
use std::path::Path;

/// Verification result.
#[derive(Debug, Default)]
pub struct VerifyResult {
    /// Number of frames that passed their checksum.
    pub frames_checked: usize,
    /// Number of operations inside those frames.
    pub ops_checked: usize,
    /// Number of stored values decoded.
    pub values_decoded: usize,
    /// Whether the journal ends in an interrupted commit.
    pub torn_tail: bool,
    /// List of errors found.
    pub errors: Vec<String>,
}

impl VerifyResult {
    /// Returns true if no errors were found.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Runs the verify command.
pub fn run(path: &Path, decode: Option<Codec>) -> Result<(), Box<dyn std::error::Error>> {
    println!("Verifying journal at {}", path.display());
    println!();

    let bytes = fs::read(path)?;
    let result = verify_bytes(&bytes, decode);

    println!("  Frames checked: {}", result.frames_checked);
    println!("  Operations:     {}", result.ops_checked);
    if let Some(codec) = decode {
        println!("  Values decoded: {} ({codec})", result.values_decoded);
    }
    if result.torn_tail {
        println!("  Warning: journal ends in an interrupted commit; it is discarded on open");
    }
    for error in &result.errors {
        println!("  Error: {error}");
    }

    println!();
    if result.is_ok() {
        println!("✓ Journal verification passed");
        Ok(())
    } else {
        println!("✗ Journal verification failed");
        Err(CliError::VerificationFailed(result.errors.len()).into())
    }
}

/// Checks journal bytes without touching the file they came from.
///
/// Every frame must pass its checksum and the frames must replay cleanly.
/// With `decode`, every stored value must also decode with that codec.
pub fn verify_bytes(bytes: &[u8], decode: Option<Codec>) -> VerifyResult {
    let mut result = VerifyResult::default();

    let scan = match scan_frames(bytes) {
        Ok(scan) => scan,
        Err(e) => {
            result.errors.push(e.to_string());
            return result;
        }
    };
    result.frames_checked = scan.frames.len();
    result.torn_tail = scan.torn_tail;

    for frame in &scan.frames {
        result.ops_checked += frame.ops.len();
        let Some(codec) = decode else { continue };
        for op in &frame.ops {
            if let JournalOp::Put {
                namespace, value, ..
            } = op
            {
                match codec.to_json_value(value) {
                    Ok(_) => result.values_decoded += 1,
                    Err(e) => result.errors.push(format!(
                        "frame at offset {}: value in {namespace}: {e}",
                        frame.offset
                    )),
                }
            }
        }
    }

    let replay = Store::open(
        Box::new(MemoryJournal::with_data(bytes.to_vec())),
        StoreOptions::default(),
    );
    if let Err(e) = replay {
        result.errors.push(format!("replay failed: {e}"));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use arenadb_storage::{record::encode_frame, FrameKind};

    fn journal() -> Vec<u8> {
        let ops = vec![
            JournalOp::CreateNamespace {
                namespace: "Team".into(),
            },
            JournalOp::Sequence {
                namespace: "Team".into(),
                value: 1,
            },
            JournalOp::Put {
                namespace: "Team".into(),
                key: b"1".to_vec(),
                value: Codec::Json.encode(&serde_json::json!({"id": 1})).unwrap(),
            },
        ];
        encode_frame(FrameKind::Commit, &ops).unwrap()
    }

    #[test]
    fn clean_journal_passes() {
        let result = verify_bytes(&journal(), Some(Codec::Json));
        assert!(result.is_ok(), "{:?}", result.errors);
        assert_eq!(result.frames_checked, 1);
        assert_eq!(result.ops_checked, 3);
        assert_eq!(result.values_decoded, 1);
    }

    #[test]
    fn torn_tail_is_only_a_warning() {
        let mut bytes = journal();
        let whole = bytes.clone();
        bytes.extend_from_slice(&whole[..whole.len() / 2]);
        let result = verify_bytes(&bytes, None);
        assert!(result.is_ok());
        assert!(result.torn_tail);
    }

    #[test]
    fn damaged_frame_fails() {
        let mut bytes = journal();
        bytes.extend_from_slice(&journal());
        bytes[20] ^= 0xff;
        let result = verify_bytes(&bytes, None);
        assert!(!result.is_ok());
    }

    #[test]
    fn undecodable_value_fails() {
        let result = verify_bytes(&journal(), Some(Codec::Cbor));
        assert!(!result.is_ok());
    }

    #[test]
    fn unreplayable_journal_fails() {
        let ops = vec![JournalOp::Put {
            namespace: "Ghost".into(),
            key: b"1".to_vec(),
            value: b"{}".to_vec(),
        }];
        let bytes = encode_frame(FrameKind::Commit, &ops).unwrap();
        let result = verify_bytes(&bytes, None);
        assert!(result.errors.iter().any(|e| e.starts_with("replay failed")));
    }
}
