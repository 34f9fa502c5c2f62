pub mod fabric;
pub mod rate_limiter;
pub mod retry_middleware;

pub use fabric::{HttpFabric, SharedHttpFabric};
