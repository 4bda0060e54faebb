//! uint256 values as emitted by Cairo contracts.
//!
//! A uint256 travels as two consecutive felts, `low` then `high`, each holding
//! 128 bits. Amounts are kept as `U256` until the final formatting step so
//! nothing is lost before the decimal string is produced.

use alloy_primitives::U256;
use thiserror::Error;

use crate::types::felt::Felt;

/// Decimals of the payment token (ETH).
pub const DEFAULT_DECIMALS: u8 = 18;

/// Largest decimal shift for which `10^decimals` fits in a `U256`.
pub const MAX_DECIMALS: u8 = 77;

/// 2^128
const U128_LIMIT: U256 = U256::from_limbs([0, 0, 1, 0]);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountDecodeError {
    #[error("uint256 {half} half {value} does not fit in 128 bits")]
    HalfOutOfRange { half: &'static str, value: Felt },

    #[error("Unsupported decimal shift {0} (max 77)")]
    UnsupportedDecimals(u8),

    #[error("Invalid decimal amount '{0}'")]
    InvalidDecimal(String),
}

/// A 256-bit unsigned integer split into two 128-bit felts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Uint256Pair {
    pub low: Felt,
    pub high: Felt,
}

impl Uint256Pair {
    pub fn new(low: Felt, high: Felt) -> Self {
        Self { low, high }
    }

    /// Reassemble `low + high * 2^128`.
    pub fn to_u256(&self) -> Result<U256, AmountDecodeError> {
        let low = self.low.as_u256();
        let high = self.high.as_u256();

        if low >= U128_LIMIT {
            return Err(AmountDecodeError::HalfOutOfRange {
                half: "low",
                value: self.low,
            });
        }
        if high >= U128_LIMIT {
            return Err(AmountDecodeError::HalfOutOfRange {
                half: "high",
                value: self.high,
            });
        }

        Ok(low | (high << 128))
    }
}

/// Format `value` as a fixed-point decimal string shifted by `decimals` places.
///
/// Trailing fractional zeros are trimmed but at least one fractional digit is
/// kept: `10^18` with 18 decimals formats as `"1.0"`.
pub fn format_units(value: U256, decimals: u8) -> Result<String, AmountDecodeError> {
    if decimals > MAX_DECIMALS {
        return Err(AmountDecodeError::UnsupportedDecimals(decimals));
    }

    let scale = U256::from(10u64).pow(U256::from(decimals));
    let whole = value / scale;
    let fraction = value % scale;

    let padded = format!("{:0>width$}", fraction.to_string(), width = decimals as usize);
    let trimmed = padded.trim_end_matches('0');
    let fraction = if trimmed.is_empty() { "0" } else { trimmed };

    Ok(format!("{}.{}", whole, fraction))
}

/// Decode a uint256 pair into a decimal string shifted by `decimals` places.
pub fn decode_amount(low: &Felt, high: &Felt, decimals: u8) -> Result<String, AmountDecodeError> {
    let value = Uint256Pair::new(*low, *high).to_u256()?;
    format_units(value, decimals)
}

/// Numeric value of a decimal amount string.
///
/// This is a lossy conversion: amounts with more significant digits than an
/// `f64` can hold are rounded. Stored prices have always been plain numbers,
/// so the rounding is kept.
pub fn amount_to_f64(amount: &str) -> Result<f64, AmountDecodeError> {
    amount
        .parse::<f64>()
        .map_err(|_| AmountDecodeError::InvalidDecimal(amount.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn felt(v: u128) -> Felt {
        Felt::from(v)
    }

    #[test]
    fn test_one_ether() {
        let amount = decode_amount(&felt(1_000_000_000_000_000_000), &felt(0), 18).unwrap();
        assert_eq!(amount, "1.0");
        assert_eq!(amount_to_f64(&amount).unwrap(), 1.0);
    }

    #[test]
    fn test_fractional_amount() {
        let amount = decode_amount(&felt(1_234_500_000_000_000), &felt(0), 18).unwrap();
        assert_eq!(amount, "0.0012345");
    }

    #[test]
    fn test_zero_amount() {
        assert_eq!(decode_amount(&felt(0), &felt(0), 18).unwrap(), "0.0");
    }

    #[test]
    fn test_high_half_beyond_u64() {
        // high = 1 => 2^128 wei
        let amount = decode_amount(&felt(0), &felt(1), 18).unwrap();
        assert_eq!(amount, "340282366920938463463.374607431768211456");

        let raw = Uint256Pair::new(felt(5), felt(1)).to_u256().unwrap();
        assert_eq!(raw, (U256::from(1u64) << 128) + U256::from(5u64));
    }

    #[test]
    fn test_max_uint256_formats_without_loss() {
        let max = felt(u128::MAX);
        let amount = decode_amount(&max, &max, 0).unwrap();
        assert_eq!(amount, format!("{}.0", U256::MAX));
    }

    #[test]
    fn test_half_out_of_range() {
        let too_big = Felt::from_u256(U256::from(1u64) << 128).unwrap();

        assert!(matches!(
            decode_amount(&too_big, &felt(0), 18),
            Err(AmountDecodeError::HalfOutOfRange { half: "low", .. })
        ));
        assert!(matches!(
            decode_amount(&felt(0), &too_big, 18),
            Err(AmountDecodeError::HalfOutOfRange { half: "high", .. })
        ));
    }

    #[test]
    fn test_unsupported_decimals() {
        assert_eq!(
            format_units(U256::from(1u64), 78),
            Err(AmountDecodeError::UnsupportedDecimals(78))
        );
    }

    #[test]
    fn test_price_rounding_is_lossy() {
        // 1 wei above 1 ether is below f64 resolution.
        let amount = decode_amount(&felt(1_000_000_000_000_000_001), &felt(0), 18).unwrap();
        assert_eq!(amount, "1.000000000000000001");
        assert_eq!(amount_to_f64(&amount).unwrap(), 1.0);
    }
}
