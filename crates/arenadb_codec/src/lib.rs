//! # ArenaDB Codec
//!
//! Record encoding for ArenaDB.
//!
//! Records are any `serde` types. This crate turns them into the bytes the
//! store keeps and back, with two guarantees:
//!
//! - Identical records produce identical bytes
//! - `decode(encode(r)) == r`
//!
//! ## Codecs
//!
//! - [`Codec::Cbor`] - compact binary CBOR via `ciborium` (the default)
//! - [`Codec::Json`] - JSON text via `serde_json`, convenient for debugging
//!
//! ## Usage
//!
//! ```
//! use arenadb_codec::Codec;
//!
//! let bytes = Codec::Json.encode(&vec![1, 2, 3]).unwrap();
//! assert_eq!(bytes, b"[1,2,3]");
//! let decoded: Vec<i32> = Codec::Json.decode(&bytes).unwrap();
//! assert_eq!(decoded, vec![1, 2, 3]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod codec;
mod error;

pub use codec::Codec;
pub use error::{CodecError, CodecResult};
