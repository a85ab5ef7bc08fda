//! Journal frame format.
//!
//! Every committed write transaction becomes one frame:
//!
//! ```text
//! magic "AJNL" (4) | version (2) | kind (1) | payload length (4) | payload | crc32 (4)
//! ```
//!
//! The payload is an operation count (u32) followed by the operations. The
//! CRC covers everything before it. All integers are little-endian.

use crate::error::{StorageError, StorageResult};

/// Magic bytes opening every frame.
pub const FRAME_MAGIC: [u8; 4] = *b"AJNL";

/// Current frame format version.
pub const FRAME_VERSION: u16 = 1;

/// magic (4) + version (2) + kind (1) + length (4)
const HEADER_SIZE: usize = 11;

const CRC_SIZE: usize = 4;

const OP_CREATE_NAMESPACE: u8 = 1;
const OP_DROP_NAMESPACE: u8 = 2;
const OP_PUT: u8 = 3;
const OP_DELETE: u8 = 4;
const OP_SEQUENCE: u8 = 5;

/// What a frame represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FrameKind {
    /// Incremental changes of one committed transaction.
    Commit = 1,
    /// Full state; replay discards everything before it.
    Snapshot = 2,
}

impl FrameKind {
    /// Converts a byte to a frame kind.
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            1 => Some(Self::Commit),
            2 => Some(Self::Snapshot),
            _ => None,
        }
    }

    /// Converts the frame kind to a byte.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }
}

/// A single journaled state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalOp {
    /// A namespace was created empty with its sequence at zero.
    CreateNamespace {
        /// Namespace name.
        namespace: String,
    },
    /// A namespace and all of its entries were removed.
    DropNamespace {
        /// Namespace name.
        namespace: String,
    },
    /// A key was inserted or overwritten.
    Put {
        /// Namespace name.
        namespace: String,
        /// Entry key.
        key: Vec<u8>,
        /// Entry value.
        value: Vec<u8>,
    },
    /// A key was removed.
    Delete {
        /// Namespace name.
        namespace: String,
        /// Entry key.
        key: Vec<u8>,
    },
    /// The namespace sequence moved to `value`.
    Sequence {
        /// Namespace name.
        namespace: String,
        /// New sequence value.
        value: u64,
    },
}

impl JournalOp {
    fn encode_into(&self, buf: &mut Vec<u8>) -> StorageResult<()> {
        match self {
            Self::CreateNamespace { namespace } => {
                buf.push(OP_CREATE_NAMESPACE);
                put_name(buf, namespace)?;
            }
            Self::DropNamespace { namespace } => {
                buf.push(OP_DROP_NAMESPACE);
                put_name(buf, namespace)?;
            }
            Self::Put {
                namespace,
                key,
                value,
            } => {
                buf.push(OP_PUT);
                put_name(buf, namespace)?;
                put_blob(buf, key)?;
                put_blob(buf, value)?;
            }
            Self::Delete { namespace, key } => {
                buf.push(OP_DELETE);
                put_name(buf, namespace)?;
                put_blob(buf, key)?;
            }
            Self::Sequence { namespace, value } => {
                buf.push(OP_SEQUENCE);
                put_name(buf, namespace)?;
                buf.extend_from_slice(&value.to_le_bytes());
            }
        }
        Ok(())
    }
}

/// A decoded, checksum-verified frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame kind.
    pub kind: FrameKind,
    /// Byte offset of the frame within the journal.
    pub offset: u64,
    /// Encoded length of the frame including envelope.
    pub len: u64,
    /// Operations carried by the frame.
    pub ops: Vec<JournalOp>,
}

/// Result of scanning a journal.
#[derive(Debug, Clone, Default)]
pub struct FrameScan {
    /// Every intact frame, in journal order.
    pub frames: Vec<Frame>,
    /// Length of the intact prefix of the journal.
    pub valid_len: u64,
    /// Whether bytes after `valid_len` were discarded as an incomplete write.
    pub torn_tail: bool,
}

/// Encodes `ops` as a single frame.
///
/// # Errors
///
/// Returns an error if a namespace name or payload exceeds the format limits.
pub fn encode_frame(kind: FrameKind, ops: &[JournalOp]) -> StorageResult<Vec<u8>> {
    let mut payload = Vec::new();
    let count = u32::try_from(ops.len())
        .map_err(|_| StorageError::corrupted(0, "too many operations for one frame"))?;
    payload.extend_from_slice(&count.to_le_bytes());
    for op in ops {
        op.encode_into(&mut payload)?;
    }

    let len = u32::try_from(payload.len())
        .map_err(|_| StorageError::corrupted(0, "frame payload too large"))?;

    let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len() + CRC_SIZE);
    frame.extend_from_slice(&FRAME_MAGIC);
    frame.extend_from_slice(&FRAME_VERSION.to_le_bytes());
    frame.push(kind.as_byte());
    frame.extend_from_slice(&len.to_le_bytes());
    frame.extend_from_slice(&payload);
    let crc = crc32fast::hash(&frame);
    frame.extend_from_slice(&crc.to_le_bytes());
    Ok(frame)
}

/// Scans a journal, returning every intact frame.
///
/// A damaged frame is treated as an interrupted write, and reported through
/// [`FrameScan::torn_tail`], only when no intact frame follows it. A damaged
/// length field can make a frame appear to run past the end of the journal,
/// so the bytes after the frame header are searched for a later intact frame
/// before anything is written off.
///
/// # Errors
///
/// Returns [`StorageError::Corrupted`] for damage before the final frame.
pub fn scan_frames(bytes: &[u8]) -> StorageResult<FrameScan> {
    let mut scan = FrameScan::default();
    let mut offset = 0usize;

    while offset < bytes.len() {
        let remaining = &bytes[offset..];
        let at = offset as u64;

        if remaining.len() < HEADER_SIZE {
            scan.torn_tail = true;
            break;
        }
        if remaining[..4] != FRAME_MAGIC {
            return Err(StorageError::corrupted(at, "bad frame magic"));
        }
        let version = u16::from_le_bytes([remaining[4], remaining[5]]);
        if version != FRAME_VERSION {
            return Err(StorageError::corrupted(
                at,
                format!("unsupported frame version {version}"),
            ));
        }
        let kind = FrameKind::from_byte(remaining[6])
            .ok_or_else(|| StorageError::corrupted(at, "unknown frame kind"))?;
        let payload_len =
            u32::from_le_bytes([remaining[7], remaining[8], remaining[9], remaining[10]]) as usize;
        let frame_len = HEADER_SIZE + payload_len + CRC_SIZE;

        if remaining.len() < frame_len {
            ensure_nothing_follows(bytes, offset)?;
            scan.torn_tail = true;
            break;
        }

        let body = &remaining[..HEADER_SIZE + payload_len];
        let stored = u32::from_le_bytes([
            remaining[frame_len - 4],
            remaining[frame_len - 3],
            remaining[frame_len - 2],
            remaining[frame_len - 1],
        ]);
        if crc32fast::hash(body) != stored {
            if remaining.len() == frame_len {
                ensure_nothing_follows(bytes, offset)?;
                scan.torn_tail = true;
                break;
            }
            return Err(StorageError::corrupted(at, "checksum mismatch"));
        }

        let ops = decode_ops(&body[HEADER_SIZE..], at)?;
        scan.frames.push(Frame {
            kind,
            offset: at,
            len: frame_len as u64,
            ops,
        });
        offset += frame_len;
        scan.valid_len = offset as u64;
    }

    Ok(scan)
}

/// Fails if an intact frame starts anywhere after the damaged frame at
/// `damaged`.
fn ensure_nothing_follows(bytes: &[u8], damaged: usize) -> StorageResult<()> {
    let first = damaged + FRAME_MAGIC.len();
    if bytes.len() < first + HEADER_SIZE + CRC_SIZE {
        return Ok(());
    }
    let last = bytes.len() - HEADER_SIZE - CRC_SIZE;
    for start in first..=last {
        if bytes[start..start + FRAME_MAGIC.len()] == FRAME_MAGIC
            && intact_frame_len(&bytes[start..]).is_some()
        {
            return Err(StorageError::corrupted(
                damaged as u64,
                format!("damaged frame followed by an intact frame at offset {start}"),
            ));
        }
    }
    Ok(())
}

/// Returns the length of the frame at the start of `bytes` if it is complete
/// and its checksum holds.
fn intact_frame_len(bytes: &[u8]) -> Option<usize> {
    if bytes.len() < HEADER_SIZE + CRC_SIZE || bytes[..4] != FRAME_MAGIC {
        return None;
    }
    if u16::from_le_bytes([bytes[4], bytes[5]]) != FRAME_VERSION {
        return None;
    }
    FrameKind::from_byte(bytes[6])?;
    let payload_len = u32::from_le_bytes([bytes[7], bytes[8], bytes[9], bytes[10]]) as usize;
    let frame_len = HEADER_SIZE
        .checked_add(payload_len)?
        .checked_add(CRC_SIZE)?;
    if bytes.len() < frame_len {
        return None;
    }
    let crc_at = frame_len - CRC_SIZE;
    let stored = u32::from_le_bytes([
        bytes[crc_at],
        bytes[crc_at + 1],
        bytes[crc_at + 2],
        bytes[crc_at + 3],
    ]);
    (crc32fast::hash(&bytes[..crc_at]) == stored).then_some(frame_len)
}

fn put_name(buf: &mut Vec<u8>, name: &str) -> StorageResult<()> {
    let len = u16::try_from(name.len()).map_err(|_| StorageError::InvalidNamespace {
        name: name.to_string(),
    })?;
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(name.as_bytes());
    Ok(())
}

fn put_blob(buf: &mut Vec<u8>, blob: &[u8]) -> StorageResult<()> {
    let len = u32::try_from(blob.len())
        .map_err(|_| StorageError::corrupted(0, "entry larger than 4 GiB"))?;
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(blob);
    Ok(())
}

fn decode_ops(payload: &[u8], offset: u64) -> StorageResult<Vec<JournalOp>> {
    let mut reader = Reader {
        data: payload,
        pos: 0,
        offset,
    };
    let count = reader.u32()?;
    let mut ops = Vec::with_capacity(count.min(1024) as usize);

    for _ in 0..count {
        let op = match reader.u8()? {
            OP_CREATE_NAMESPACE => JournalOp::CreateNamespace {
                namespace: reader.name()?,
            },
            OP_DROP_NAMESPACE => JournalOp::DropNamespace {
                namespace: reader.name()?,
            },
            OP_PUT => JournalOp::Put {
                namespace: reader.name()?,
                key: reader.blob()?,
                value: reader.blob()?,
            },
            OP_DELETE => JournalOp::Delete {
                namespace: reader.name()?,
                key: reader.blob()?,
            },
            OP_SEQUENCE => JournalOp::Sequence {
                namespace: reader.name()?,
                value: reader.u64()?,
            },
            other => {
                return Err(StorageError::corrupted(
                    offset,
                    format!("unknown operation tag {other}"),
                ))
            }
        };
        ops.push(op);
    }

    if reader.pos != payload.len() {
        return Err(StorageError::corrupted(offset, "trailing bytes in frame"));
    }
    Ok(ops)
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    offset: u64,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> StorageResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| StorageError::corrupted(self.offset, "unexpected end of frame"))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> StorageResult<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> StorageResult<u16> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> StorageResult<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u64(&mut self) -> StorageResult<u64> {
        let b = self.take(8)?;
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(b);
        Ok(u64::from_le_bytes(bytes))
    }

    fn name(&mut self) -> StorageResult<String> {
        let len = self.u16()? as usize;
        let raw = self.take(len)?;
        String::from_utf8(raw.to_vec())
            .map_err(|_| StorageError::corrupted(self.offset, "namespace is not UTF-8"))
    }

    fn blob(&mut self) -> StorageResult<Vec<u8>> {
        let len = self.u32()? as usize;
        Ok(self.take(len)?.to_vec())
    }
}
