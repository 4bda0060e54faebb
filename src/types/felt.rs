//! Starknet field element.
//!
//! Every value an event carries (addresses, integers, identifiers, encoded
//! domain labels) is a felt. Felts are held as a `U256` that is always below
//! the field prime.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::U256;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// 2^251 + 17 * 2^192 + 1
pub const FIELD_PRIME: U256 = U256::from_limbs([1, 0, 0, 0x0800_0000_0000_0011]);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeltParseError {
    #[error("Empty felt string")]
    Empty,
    #[error("Invalid felt '{input}': {reason}")]
    Invalid { input: String, reason: String },
    #[error("Felt {0} is not below the field prime")]
    OutOfRange(U256),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Felt(U256);

impl Felt {
    pub const ZERO: Felt = Felt(U256::ZERO);

    /// Wrap a `U256`, rejecting values outside the field.
    pub fn from_u256(value: U256) -> Result<Self, FeltParseError> {
        if value >= FIELD_PRIME {
            return Err(FeltParseError::OutOfRange(value));
        }
        Ok(Self(value))
    }

    /// Caller guarantees `value < FIELD_PRIME`.
    pub(crate) const fn from_u256_unchecked(value: U256) -> Self {
        Self(value)
    }

    pub fn as_u256(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn to_u64(&self) -> Option<u64> {
        u64::try_from(self.0).ok()
    }

    /// 64 lowercase hex digits, no `0x` prefix.
    pub fn to_hex_unprefixed(&self) -> String {
        hex::encode(self.0.to_be_bytes::<32>())
    }

    pub fn to_decimal_string(&self) -> String {
        self.0.to_string()
    }
}

impl From<u64> for Felt {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl From<u128> for Felt {
    fn from(value: u128) -> Self {
        Self(U256::from(value))
    }
}

impl FromStr for Felt {
    type Err = FeltParseError;

    /// Accepts `0x`-prefixed hex (as delivered by the stream) or plain decimal.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(FeltParseError::Empty);
        }

        let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some("") => return Err(FeltParseError::Empty),
            Some(digits) => U256::from_str_radix(digits, 16),
            None => U256::from_str_radix(s, 10),
        };

        let value = parsed.map_err(|e| FeltParseError::Invalid {
            input: s.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_u256(value)
    }
}

impl fmt::Display for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex_unprefixed())
    }
}

impl Serialize for Felt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Felt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FeltVisitor;

        impl Visitor<'_> for FeltVisitor {
            type Value = Felt;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a hex or decimal felt string, or an unsigned integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Felt, E> {
                Felt::from_str(v).map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Felt, E> {
                Ok(Felt::from(v))
            }
        }

        deserializer.deserialize_any(FeltVisitor)
    }
}

/// Serialize a felt as a JSON number instead of a hex string.
///
/// Values above `u64::MAX` degrade to the nearest `f64`, which is what the
/// sales collection has always stored for sponsor fields.
pub fn serialize_as_number<S: Serializer>(felt: &Felt, serializer: S) -> Result<S::Ok, S::Error> {
    match felt.to_u64() {
        Some(v) => serializer.serialize_u64(v),
        None => {
            let approx: f64 = felt
                .to_decimal_string()
                .parse()
                .map_err(serde::ser::Error::custom)?;
            serializer.serialize_f64(approx)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_and_decimal() {
        let hex_felt: Felt = "0x2a".parse().unwrap();
        let dec_felt: Felt = "42".parse().unwrap();
        assert_eq!(hex_felt, dec_felt);
        assert_eq!(hex_felt, Felt::from(42u64));
    }

    #[test]
    fn test_parse_padded_hex() {
        let felt: Felt = "0x00000000000000000000000000000000000000000000000000000000000000ff"
            .parse()
            .unwrap();
        assert_eq!(felt.to_u64(), Some(255));
    }

    #[test]
    fn test_display_is_padded() {
        let felt = Felt::from(255u64);
        assert_eq!(
            felt.to_string(),
            "0x00000000000000000000000000000000000000000000000000000000000000ff"
        );
        assert_eq!(felt.to_hex_unprefixed().len(), 64);
    }

    #[test]
    fn test_rejects_field_overflow() {
        let prime = format!("0x{:x}", FIELD_PRIME);
        assert!(matches!(
            prime.parse::<Felt>(),
            Err(FeltParseError::OutOfRange(_))
        ));

        let max = FIELD_PRIME - U256::from(1u64);
        assert!(Felt::from_u256(max).is_ok());
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!("".parse::<Felt>(), Err(FeltParseError::Empty));
        assert_eq!("0x".parse::<Felt>(), Err(FeltParseError::Empty));
        assert!(matches!(
            "0xzz".parse::<Felt>(),
            Err(FeltParseError::Invalid { .. })
        ));
    }

    #[test]
    fn test_serde_round_trip_through_json() {
        let felt: Felt = serde_json::from_str("\"0x1234\"").unwrap();
        assert_eq!(felt, Felt::from(0x1234u64));

        let from_number: Felt = serde_json::from_str("7").unwrap();
        assert_eq!(from_number, Felt::from(7u64));

        let json = serde_json::to_string(&felt).unwrap();
        assert_eq!(json, format!("\"{}\"", felt));
    }

    #[test]
    fn test_serialize_as_number() {
        #[derive(Serialize)]
        struct Wrapper {
            #[serde(serialize_with = "serialize_as_number")]
            value: Felt,
        }

        let small = serde_json::to_value(Wrapper {
            value: Felt::from(999u64),
        })
        .unwrap();
        assert_eq!(small["value"], serde_json::json!(999));

        let big: Felt = "0x7e00d496e324876bbc8531f2d9a82bf154d1a04a50218ee74cdd372f75a551a"
            .parse()
            .unwrap();
        let json = serde_json::to_value(Wrapper { value: big }).unwrap();
        let approx = json["value"].as_f64().unwrap();
        assert!(approx > 3.5e75 && approx < 3.6e75);
    }
}
