use serde::{Deserialize, Serialize};

use super::ids::Venue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Yes,
    No,
    Long,
    Short,
}

/// The venue-native shape, discarded once normalized into a `Position`.
#[derive(Debug, Clone)]
pub struct RawPosition {
    pub outcome_id: String,
    pub market_id: String,
    pub outcome_name: String,
    pub size: f64,
    pub entry_price: f64,
    pub mark_price: f64,
    pub unrealized_pnl: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub id: String,
    pub user_id: String,
    pub platform: Venue,
    pub market_id: String,
    pub outcome_id: String,
    pub side: Side,
    pub shares: f64,
    pub avg_price: f64,
    pub current_price: f64,
    pub pnl: f64,
    pub pnl_pct: f64,
    pub value: f64,
    pub opened_at_ms: i64,
}

impl Position {
    /// Derives `value`, `pnl`, `pnl_pct` from shares/avg_price/current_price,
    /// per §3: `value = shares * current_price`; `pnl = shares * (current -
    /// avg)` for long-equivalents (YES/LONG). Short-equivalents invert the
    /// sign since a price drop is profit.
    pub fn recompute_derived(&mut self) {
        self.value = self.shares * self.current_price;
        let raw_pnl = self.shares * (self.current_price - self.avg_price);
        self.pnl = match self.side {
            Side::No | Side::Short => -raw_pnl,
            Side::Yes | Side::Long => raw_pnl,
        };
        let cost_basis = self.shares * self.avg_price;
        self.pnl_pct = if cost_basis != 0.0 {
            self.pnl / cost_basis * 100.0
        } else {
            0.0
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(side: Side) -> Position {
        Position {
            id: "p1".into(),
            user_id: "u1".into(),
            platform: Venue::Polymarket,
            market_id: "m1".into(),
            outcome_id: "m1-YES".into(),
            side,
            shares: 100.0,
            avg_price: 0.5,
            current_price: 0.6,
            pnl: 0.0,
            pnl_pct: 0.0,
            value: 0.0,
            opened_at_ms: 0,
        }
    }

    #[test]
    fn long_equivalent_pnl_is_positive_on_price_increase() {
        let mut p = base(Side::Yes);
        p.recompute_derived();
        assert_eq!(p.value, 60.0);
        assert!((p.pnl - 10.0).abs() < 1e-9);
        assert!((p.pnl_pct - 20.0).abs() < 1e-9);
    }

    #[test]
    fn short_equivalent_pnl_inverts_sign() {
        let mut p = base(Side::Short);
        p.recompute_derived();
        assert!((p.pnl - (-10.0)).abs() < 1e-9);
    }

    #[test]
    fn zero_cost_basis_yields_zero_pnl_pct() {
        let mut p = base(Side::Yes);
        p.avg_price = 0.0;
        p.recompute_derived();
        assert_eq!(p.pnl_pct, 0.0);
    }
}
