//! Mapping between record identifiers and storage keys.

use std::fmt;
use std::str::FromStr;

/// How record identifiers are turned into storage keys.
///
/// Records are returned in ascending byte order of their keys, so the
/// encoding decides the iteration order of a table.
///
/// | Encoding | Key for `10` | Order of 1, 2, 10 |
/// |----------|--------------|-------------------|
/// | `Decimal` | `b"10"` | 1, 10, 2 |
/// | `BigEndian` | `00 .. 00 0a` | 1, 2, 10 |
///
/// The encoding is fixed per database file: reopening a journal with a
/// different encoding makes existing records unreachable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum KeyEncoding {
    /// Base-10 ASCII digits, ordered lexicographically.
    #[default]
    Decimal,
    /// 8-byte big-endian two's complement, ordered numerically for positive
    /// identifiers.
    BigEndian,
}

impl KeyEncoding {
    /// Returns the encoding's short name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Decimal => "decimal",
            Self::BigEndian => "big-endian",
        }
    }

    /// Encodes an identifier as a storage key.
    #[must_use]
    pub fn encode(self, id: i64) -> Vec<u8> {
        match self {
            Self::Decimal => id.to_string().into_bytes(),
            Self::BigEndian => id.to_be_bytes().to_vec(),
        }
    }

    /// Decodes a storage key back into an identifier.
    ///
    /// Returns `None` for keys this encoding never produces, including
    /// decimal keys with leading zeros or a plus sign.
    #[must_use]
    pub fn decode(self, key: &[u8]) -> Option<i64> {
        match self {
            Self::Decimal => {
                let text = std::str::from_utf8(key).ok()?;
                let id: i64 = text.parse().ok()?;
                (id.to_string() == text).then_some(id)
            }
            Self::BigEndian => {
                let bytes: [u8; 8] = key.try_into().ok()?;
                Some(i64::from_be_bytes(bytes))
            }
        }
    }
}

impl fmt::Display for KeyEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KeyEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "decimal" => Ok(Self::Decimal),
            "big-endian" | "bigendian" | "be" => Ok(Self::BigEndian),
            _ => Err(format!(
                "unknown key encoding {s:?} (expected \"decimal\" or \"big-endian\")"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn decimal_keys_are_ascii_digits() {
        assert_eq!(KeyEncoding::Decimal.encode(1), b"1");
        assert_eq!(KeyEncoding::Decimal.encode(254), b"254");
    }

    #[test]
    fn decimal_order_is_lexicographic() {
        let mut keys: Vec<Vec<u8>> = (1..=10).map(|id| KeyEncoding::Decimal.encode(id)).collect();
        keys.sort();
        let ids: Vec<i64> = keys
            .iter()
            .map(|k| KeyEncoding::Decimal.decode(k).unwrap())
            .collect();
        assert_eq!(ids, vec![1, 10, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn big_endian_order_is_numeric() {
        let mut keys: Vec<Vec<u8>> = [10, 2, 1, 300, 20]
            .into_iter()
            .map(|id| KeyEncoding::BigEndian.encode(id))
            .collect();
        keys.sort();
        let ids: Vec<i64> = keys
            .iter()
            .map(|k| KeyEncoding::BigEndian.decode(k).unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2, 10, 20, 300]);
    }

    #[test]
    fn decode_rejects_foreign_keys() {
        assert_eq!(KeyEncoding::Decimal.decode(b"007"), None);
        assert_eq!(KeyEncoding::Decimal.decode(b"+7"), None);
        assert_eq!(KeyEncoding::Decimal.decode(b"seven"), None);
        assert_eq!(KeyEncoding::BigEndian.decode(b"7"), None);
    }

    #[test]
    fn parse_names() {
        assert_eq!("decimal".parse::<KeyEncoding>(), Ok(KeyEncoding::Decimal));
        assert_eq!("Big-Endian".parse::<KeyEncoding>(), Ok(KeyEncoding::BigEndian));
        assert!("hex".parse::<KeyEncoding>().is_err());
    }

    proptest! {
        #[test]
        fn positive_ids_roundtrip(id in 1..=i64::MAX) {
            for encoding in [KeyEncoding::Decimal, KeyEncoding::BigEndian] {
                prop_assert_eq!(encoding.decode(&encoding.encode(id)), Some(id));
            }
        }

        #[test]
        fn big_endian_preserves_order(a in 1..=i64::MAX, b in 1..=i64::MAX) {
            let ka = KeyEncoding::BigEndian.encode(a);
            let kb = KeyEncoding::BigEndian.encode(b);
            prop_assert_eq!(a.cmp(&b), ka.cmp(&kb));
        }
    }
}
