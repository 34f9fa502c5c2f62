//! `Venue` and `Channel` are kept as distinct types even though both are
//! persisted as plain strings in the Store. The source system this was
//! distilled from overloaded a single "platform" string for both a trading
//! venue (`polymarket`) and a chat channel namespace (`telegram`) — see
//! Open Question in DESIGN.md. We don't guess at coexistence semantics for
//! overlapping names; callers must pick the type that matches the context.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Venue {
    Polymarket,
    Kalshi,
    Manifold,
    Metaculus,
    Hyperliquid,
    Binance,
    Bybit,
    Mexc,
}

impl Venue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Venue::Polymarket => "polymarket",
            Venue::Kalshi => "kalshi",
            Venue::Manifold => "manifold",
            Venue::Metaculus => "metaculus",
            Venue::Hyperliquid => "hyperliquid",
            Venue::Binance => "binance",
            Venue::Bybit => "bybit",
            Venue::Mexc => "mexc",
        }
    }

    /// Venues whose execution adapter is in scope (§4.C: perp venues here
    /// are read-only).
    pub fn supports_execution(&self) -> bool {
        matches!(self, Venue::Polymarket | Venue::Kalshi | Venue::Manifold)
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Venue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "polymarket" => Ok(Venue::Polymarket),
            "kalshi" => Ok(Venue::Kalshi),
            "manifold" => Ok(Venue::Manifold),
            "metaculus" => Ok(Venue::Metaculus),
            "hyperliquid" => Ok(Venue::Hyperliquid),
            "binance" => Ok(Venue::Binance),
            "bybit" => Ok(Venue::Bybit),
            "mexc" => Ok(Venue::Mexc),
            other => Err(format!("unknown venue: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Telegram,
    Discord,
    Slack,
    Web,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Telegram => "telegram",
            Channel::Discord => "discord",
            Channel::Slack => "slack",
            Channel::Web => "web",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "telegram" => Ok(Channel::Telegram),
            "discord" => Ok(Channel::Discord),
            "slack" => Ok(Channel::Slack),
            "web" => Ok(Channel::Web),
            other => Err(format!("unknown channel: {other}")),
        }
    }
}
