//! Database configuration.

use crate::key::KeyEncoding;
use arenadb_codec::Codec;

/// Configuration for opening a database.
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether to create the database file if it doesn't exist.
    pub create_if_missing: bool,

    /// Whether to sync the journal on every commit (safer but slower).
    pub sync_on_commit: bool,

    /// How record identifiers become storage keys.
    pub key_encoding: KeyEncoding,

    /// How records become stored bytes.
    pub codec: Codec,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            sync_on_commit: true,
            key_encoding: KeyEncoding::Decimal,
            codec: Codec::Cbor,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to create the database if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether to sync the journal on every commit.
    #[must_use]
    pub const fn sync_on_commit(mut self, value: bool) -> Self {
        self.sync_on_commit = value;
        self
    }

    /// Sets the identifier key encoding.
    #[must_use]
    pub const fn key_encoding(mut self, value: KeyEncoding) -> Self {
        self.key_encoding = value;
        self
    }

    /// Sets the record codec.
    #[must_use]
    pub const fn codec(mut self, value: Codec) -> Self {
        self.codec = value;
        self
    }
}
