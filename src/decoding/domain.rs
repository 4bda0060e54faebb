//! Naming-service domain decoding.
//!
//! Each domain label is a felt encoding a base-38 string over
//! `abcdefghijklmnopqrstuvwxyz0123456789-`. Digit 37 is an escape: it either
//! marks a trailing `a` (which would otherwise vanish as a leading zero) or
//! introduces a character from the two-letter big alphabet `这来`.
//! Labels are ordered from the innermost subdomain to the root.

use std::iter;

use alloy_primitives::U256;
use thiserror::Error;

use crate::types::felt::Felt;

const BASIC_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789-";
const BIG_ALPHABET: [char; 2] = ['这', '来'];
const ROOT_SUFFIX: &str = "stark";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainDecodeError {
    #[error("Label {label} ends with invalid escape code {code}")]
    InvalidEscape { label: Felt, code: usize },
}

fn small_index(value: U256) -> usize {
    value.as_limbs()[0] as usize
}

fn basic_char(index: usize) -> char {
    BASIC_ALPHABET[index] as char
}

/// Decode a single label.
pub fn decode_label(label: &Felt) -> Result<String, DomainDecodeError> {
    let basic_size = U256::from(BASIC_ALPHABET.len());
    let basic_size_plus_one = U256::from(BASIC_ALPHABET.len() + 1);
    let big_size = U256::from(BIG_ALPHABET.len());

    let mut felt = label.as_u256();
    let mut decoded = String::new();

    while !felt.is_zero() {
        let code = felt % basic_size_plus_one;
        felt /= basic_size_plus_one;

        if code != basic_size {
            decoded.push(basic_char(small_index(code)));
            continue;
        }

        let next = felt / basic_size_plus_one;
        if next.is_zero() {
            let code2 = small_index(felt % basic_size_plus_one);
            felt = next;
            if code2 == 0 {
                decoded.push(basic_char(0));
            } else {
                let c = BIG_ALPHABET
                    .get(code2 - 1)
                    .ok_or(DomainDecodeError::InvalidEscape {
                        label: *label,
                        code: code2,
                    })?;
                decoded.push(*c);
            }
        } else {
            decoded.push(BIG_ALPHABET[small_index(felt % big_size)]);
            felt /= big_size;
        }
    }

    Ok(normalize_trailing_big_chars(decoded))
}

/// Undo the encoder's expansion of trailing `来` runs.
fn normalize_trailing_big_chars(decoded: String) -> String {
    let last = BIG_ALPHABET[BIG_ALPHABET.len() - 1];
    let stem = decoded.trim_end_matches(last);
    let k = decoded[stem.len()..].chars().count();
    if k == 0 {
        return decoded;
    }

    let mut out = stem.to_string();
    if k % 2 == 0 {
        out.extend(iter::repeat(last).take(k / 2 - 1));
        out.push(BIG_ALPHABET[0]);
        out.push(basic_char(1));
    } else {
        out.extend(iter::repeat(last).take((k - 1) / 2 + 1));
    }
    out
}

/// Decode an ordered label sequence into a dot-joined domain ending in `.stark`.
///
/// Labels that decode to nothing before the first non-empty one are dropped;
/// a sequence with no content decodes to the empty string.
pub fn decode_domain(labels: &[Felt]) -> Result<String, DomainDecodeError> {
    let mut decoded = String::new();
    for label in labels {
        decoded.push_str(&decode_label(label)?);
        if !decoded.is_empty() {
            decoded.push('.');
        }
    }

    if decoded.is_empty() {
        return Ok(decoded);
    }
    decoded.push_str(ROOT_SUFFIX);
    Ok(decoded)
}

/// Decode a root domain carried as a single label.
pub fn decode_root_domain(label: &Felt) -> Result<String, DomainDecodeError> {
    decode_domain(std::slice::from_ref(label))
}
