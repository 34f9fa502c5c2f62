//! Pure numeric normalization rules shared by venue adapters, colocated
//! with unit tests the way `SpreadCache` keeps its math
//! next to its tests.

use crate::domain::position::Side;

/// Kalshi prices arrive fractional when already ≤1, else as a percent
/// (0–100) that needs dividing down.
pub fn kalshi_price(raw: f64) -> f64 {
    if raw <= 1.0 { raw } else { raw / 100.0 }
}

/// Manifold probabilities are already in [0,1]; the NO-side price is the
/// complement, clamped so floating error can't push it negative.
pub fn manifold_no_price(prob: f64) -> f64 {
    (1.0 - prob).max(0.0)
}

/// Perp venues report `entryPx` and `unrealizedPnl`; derive a mark price
/// consistent with `pnl = size * (mark - entry)` when a position is open.
pub fn perp_current_price(entry_px: f64, unrealized_pnl: f64, size: f64) -> f64 {
    if size > 0.0 {
        entry_px + unrealized_pnl / size
    } else {
        entry_px
    }
}

/// Perp sides come from the signed size field (`szi`/`positionAmt`/`size`).
pub fn derive_perp_side(signed_size: f64) -> Side {
    if signed_size > 0.0 { Side::Long } else { Side::Short }
}

/// Prediction-market sides come from the outcome label, not a signed
/// quantity: anything mentioning "no" (case-insensitive) is the NO side.
pub fn derive_outcome_side(outcome_text: &str) -> Side {
    if outcome_text.to_lowercase().contains("no") {
        Side::No
    } else {
        Side::Yes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kalshi_price_passes_through_fractions() {
        assert_eq!(kalshi_price(0.62), 0.62);
    }

    #[test]
    fn kalshi_price_divides_percents() {
        assert_eq!(kalshi_price(62.0), 0.62);
    }

    #[test]
    fn manifold_no_price_is_complement() {
        assert!((manifold_no_price(0.3) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn manifold_no_price_clamps_at_zero() {
        assert_eq!(manifold_no_price(1.0000001), 0.0);
    }

    #[test]
    fn perp_current_price_uses_pnl_when_sized() {
        let price = perp_current_price(100.0, 50.0, 10.0);
        assert_eq!(price, 105.0);
    }

    #[test]
    fn perp_current_price_falls_back_to_entry_when_unsized() {
        assert_eq!(perp_current_price(100.0, 50.0, 0.0), 100.0);
    }

    #[test]
    fn derive_perp_side_from_sign() {
        assert_eq!(derive_perp_side(5.0), Side::Long);
        assert_eq!(derive_perp_side(-5.0), Side::Short);
        assert_eq!(derive_perp_side(0.0), Side::Short);
    }

    #[test]
    fn derive_outcome_side_from_label() {
        assert_eq!(derive_outcome_side("No"), Side::No);
        assert_eq!(derive_outcome_side("NO - will not happen"), Side::No);
        assert_eq!(derive_outcome_side("Yes"), Side::Yes);
    }
}
