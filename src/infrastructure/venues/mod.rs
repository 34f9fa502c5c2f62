pub mod binance;
pub mod bybit;
pub mod feeds;
pub mod hyperliquid;
pub mod kalshi;
pub mod manifold;
pub mod metaculus;
pub mod mexc;
pub mod normalize;
pub mod polymarket;

pub use feeds::Feeds;
