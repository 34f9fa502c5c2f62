use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    pub name: String,
    pub price: f64,
    pub previous_price: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    pub platform: String,
    pub market_id: String,
    pub question: String,
    pub outcomes: Vec<Outcome>,
    pub volume_24h: Option<f64>,
    /// Epoch millis this snapshot was fetched; used for market cache TTL.
    pub fetched_at_ms: i64,
}

impl Market {
    /// The primary outcome is the one named "yes" (case-insensitive) or,
    /// failing that, index 0. Returns `None` for an empty outcome set.
    pub fn primary_outcome(&self) -> Option<&Outcome> {
        self.outcomes
            .iter()
            .find(|o| o.name.eq_ignore_ascii_case("yes"))
            .or_else(|| self.outcomes.first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market(outcomes: Vec<(&str, f64)>) -> Market {
        Market {
            platform: "polymarket".into(),
            market_id: "m1".into(),
            question: "Will it happen?".into(),
            outcomes: outcomes
                .into_iter()
                .map(|(name, price)| Outcome {
                    name: name.to_string(),
                    price,
                    previous_price: None,
                })
                .collect(),
            volume_24h: None,
            fetched_at_ms: 0,
        }
    }

    #[test]
    fn finds_yes_outcome_case_insensitively() {
        let m = market(vec![("No", 0.3), ("Yes", 0.7)]);
        assert_eq!(m.primary_outcome().unwrap().name, "Yes");
    }

    #[test]
    fn falls_back_to_first_outcome() {
        let m = market(vec![("Team A", 0.6), ("Team B", 0.4)]);
        assert_eq!(m.primary_outcome().unwrap().name, "Team A");
    }

    #[test]
    fn empty_outcomes_returns_none() {
        let m = market(vec![]);
        assert!(m.primary_outcome().is_none());
    }
}
