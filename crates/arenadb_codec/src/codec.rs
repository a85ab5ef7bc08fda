//! Record codecs.

use crate::error::{CodecError, CodecResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// The byte encoding used for stored records.
///
/// Both codecs are deterministic: a record always encodes to the same
/// bytes, and `decode(encode(r)) == r` for every record whose `Serialize`
/// and `Deserialize` implementations agree.
///
/// # Example
///
/// ```
/// use arenadb_codec::Codec;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
/// struct Team {
///     id: i64,
///     name: String,
/// }
///
/// let team = Team { id: 254, name: "The Cheesy Poofs".into() };
/// let bytes = Codec::Cbor.encode(&team).unwrap();
/// let decoded: Team = Codec::Cbor.decode(&bytes).unwrap();
/// assert_eq!(team, decoded);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Codec {
    /// Compact binary CBOR (RFC 8949).
    #[default]
    Cbor,
    /// UTF-8 JSON text.
    Json,
}

impl Codec {
    /// Returns the codec's short name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cbor => "cbor",
            Self::Json => "json",
        }
    }

    /// Encodes `value` to bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::EncodingFailed`] if the value's `Serialize`
    /// implementation fails.
    pub fn encode<T: Serialize + ?Sized>(self, value: &T) -> CodecResult<Vec<u8>> {
        match self {
            Self::Cbor => {
                let mut buf = Vec::new();
                ciborium::into_writer(value, &mut buf)
                    .map_err(|e| CodecError::encoding_failed(self.name(), e.to_string()))?;
                Ok(buf)
            }
            Self::Json => serde_json::to_vec(value)
                .map_err(|e| CodecError::encoding_failed(self.name(), e.to_string())),
        }
    }

    /// Decodes bytes produced by [`encode`](Self::encode).
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::DecodingFailed`] if the bytes are malformed or do
    /// not match `T`.
    pub fn decode<T: DeserializeOwned>(self, bytes: &[u8]) -> CodecResult<T> {
        match self {
            Self::Cbor => ciborium::from_reader(bytes)
                .map_err(|e| CodecError::decoding_failed(self.name(), e.to_string())),
            Self::Json => serde_json::from_slice(bytes)
                .map_err(|e| CodecError::decoding_failed(self.name(), e.to_string())),
        }
    }

    /// Decodes stored bytes into a schema-less JSON value.
    ///
    /// Used by tooling that inspects records without knowing their type.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::DecodingFailed`] if the bytes are malformed.
    pub fn to_json_value(self, bytes: &[u8]) -> CodecResult<serde_json::Value> {
        self.decode(bytes)
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Codec {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cbor" => Ok(Self::Cbor),
            "json" => Ok(Self::Json),
            _ => Err(CodecError::UnknownCodec { name: s.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Match {
        id: i64,
        kind: String,
        red: [i32; 3],
        blue: [i32; 3],
        notes: Option<String>,
        tba_synced: bool,
    }

    fn sample() -> Match {
        Match {
            id: 12,
            kind: "Qualification".into(),
            red: [254, 1114, 2056],
            blue: [148, 118, 971],
            notes: None,
            tba_synced: true,
        }
    }

    #[test]
    fn cbor_roundtrip() {
        let bytes = Codec::Cbor.encode(&sample()).unwrap();
        let decoded: Match = Codec::Cbor.decode(&bytes).unwrap();
        assert_eq!(decoded, sample());
    }

    #[test]
    fn json_roundtrip_is_readable() {
        let bytes = Codec::Json.encode(&sample()).unwrap();
        let text = std::str::from_utf8(&bytes).unwrap();
        assert!(text.starts_with("{\"id\":12,"));
        let decoded: Match = Codec::Json.decode(&bytes).unwrap();
        assert_eq!(decoded, sample());
    }

    #[test]
    fn encoding_is_deterministic() {
        for codec in [Codec::Cbor, Codec::Json] {
            let a = codec.encode(&sample()).unwrap();
            let b = codec.encode(&sample().clone()).unwrap();
            assert_eq!(a, b, "{codec} output differs");
        }
    }

    #[test]
    fn decoding_garbage_fails() {
        let result: CodecResult<Match> = Codec::Cbor.decode(&[0xff, 0x00, 0x13]);
        assert!(matches!(
            result,
            Err(CodecError::DecodingFailed { codec: "cbor", .. })
        ));

        let result: CodecResult<Match> = Codec::Json.decode(b"{\"id\":");
        assert!(matches!(
            result,
            Err(CodecError::DecodingFailed { codec: "json", .. })
        ));
    }

    #[test]
    fn decoding_wrong_shape_fails() {
        let bytes = Codec::Cbor.encode(&vec![1, 2, 3]).unwrap();
        assert!(Codec::Cbor.decode::<Match>(&bytes).is_err());
    }

    #[test]
    fn cbor_converts_to_json_value() {
        let bytes = Codec::Cbor.encode(&sample()).unwrap();
        let value = Codec::Cbor.to_json_value(&bytes).unwrap();
        assert_eq!(value["id"], 12);
        assert_eq!(value["red"][1], 1114);
        assert!(value["notes"].is_null());
    }

    #[test]
    fn parse_codec_names() {
        assert_eq!("cbor".parse::<Codec>().unwrap(), Codec::Cbor);
        assert_eq!("JSON".parse::<Codec>().unwrap(), Codec::Json);
        assert!(matches!(
            "yaml".parse::<Codec>(),
            Err(CodecError::UnknownCodec { .. })
        ));
        assert_eq!(Codec::default().to_string(), "cbor");
    }

    proptest! {
        #[test]
        fn any_record_survives_cbor(
            id in any::<i64>(),
            kind in "[A-Za-z ]{0,24}",
            red in any::<[i32; 3]>(),
            notes in proptest::option::of("[ -~]{0,40}"),
        ) {
            let record = Match { id, kind, red, blue: [0; 3], notes, tba_synced: false };
            let bytes = Codec::Cbor.encode(&record).unwrap();
            let decoded: Match = Codec::Cbor.decode(&bytes).unwrap();
            prop_assert_eq!(decoded, record);
        }
    }
}
