//! Exact decimal-string parsing into base units, the one place this crate
//! needs exact decimal arithmetic rather than the `f64` used everywhere
//! else for price math ("all price arithmetic uses IEEE-754
//! doubles"). Token/share amounts quoted in human-readable decimal strings
//! must not silently lose precision when scaled to an integer base-unit
//! count, so this boundary uses `rust_decimal` instead.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AmountError {
    #[error("could not parse amount {raw:?}: {reason}")]
    Invalid { raw: String, reason: String },

    #[error("amount {raw:?} has more than {decimals} decimal places")]
    TooPrecise { raw: String, decimals: u32 },
}

/// Parses a human-readable decimal string into an integer count of base
/// units at `decimals` precision. `parseAmount("0.1", 6) == 100_000`;
/// `parseAmount("0.0000001", 6)` errors — the input carries more
/// fractional digits than the target precision can represent exactly.
pub fn parse_amount(raw: &str, decimals: u32) -> Result<i64, AmountError> {
    let value = Decimal::from_str(raw.trim()).map_err(|e| AmountError::Invalid {
        raw: raw.to_string(),
        reason: e.to_string(),
    })?;

    if value.scale() > decimals {
        return Err(AmountError::TooPrecise {
            raw: raw.to_string(),
            decimals,
        });
    }

    let scale_factor = Decimal::from(10i64.pow(decimals));
    let scaled = value * scale_factor;

    scaled.to_i64().ok_or_else(|| AmountError::Invalid {
        raw: raw.to_string(),
        reason: "scaled amount does not fit in i64".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_simple_fraction_into_base_units() {
        assert_eq!(parse_amount("0.1", 6).unwrap(), 100_000);
    }

    #[test]
    fn rejects_more_decimal_places_than_precision_allows() {
        assert!(parse_amount("0.0000001", 6).is_err());
    }

    #[test]
    fn accepts_exactly_the_allowed_precision() {
        assert_eq!(parse_amount("0.000001", 6).unwrap(), 1);
    }

    #[test]
    fn whole_numbers_scale_cleanly() {
        assert_eq!(parse_amount("2", 6).unwrap(), 2_000_000);
    }

    #[test]
    fn rejects_garbage_input() {
        assert!(parse_amount("not-a-number", 6).is_err());
    }
}
