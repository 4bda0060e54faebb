//! Decoding primitives shared by every transform.

pub mod domain;
pub mod selectors;
pub mod uint256;

pub use domain::{decode_domain, decode_root_domain, DomainDecodeError};
pub use selectors::{get_selector_from_name, EventKind, SelectorTable};
pub use uint256::{amount_to_f64, decode_amount, AmountDecodeError, Uint256Pair};
