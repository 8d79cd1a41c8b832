//! Decimal-string codec for integers crossing the wire or config boundary.
//!
//! Values are never narrowed to a machine word: a field holds as many digits
//! as the number needs, up to [`MAX_DECIMAL_DIGITS`].

use num_bigint::BigUint;

use crate::{Error, Result};

/// Upper bound on accepted digits (enough for values of roughly 13,000 bits).
pub const MAX_DECIMAL_DIGITS: usize = 4096;

/// Parses an unsigned base-10 integer.
///
/// Only ASCII digits are accepted: no sign, whitespace, separators or prefix.
pub fn decode(field: &'static str, text: &str) -> Result<BigUint> {
    if text.is_empty() {
        return Err(Error::InvalidEncoding {
            field,
            reason: "empty value".to_string(),
        });
    }

    if text.len() > MAX_DECIMAL_DIGITS {
        return Err(Error::InvalidEncoding {
            field,
            reason: format!("more than {MAX_DECIMAL_DIGITS} digits"),
        });
    }

    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidEncoding {
            field,
            reason: "expected only decimal digits".to_string(),
        });
    }

    BigUint::parse_bytes(text.as_bytes(), 10).ok_or_else(|| Error::InvalidEncoding {
        field,
        reason: "not a decimal integer".to_string(),
    })
}

/// Formats an integer as base-10 text.
pub fn encode(value: &BigUint) -> String {
    value.to_str_radix(10)
}
