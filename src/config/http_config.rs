//! HTTP fabric environment configuration.

use anyhow::Result;

use super::{parse_f64, parse_u64, parse_usize};

#[derive(Debug, Clone)]
pub struct HttpEnvConfig {
    pub max_attempts: usize,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter: f64,
    pub backoff_mult: f64,
    pub retry_methods: Vec<String>,
    /// Default requests-per-window for the sliding window limiter.
    pub rate_default_max_requests: usize,
    pub rate_default_window_ms: u64,
}

impl HttpEnvConfig {
    pub fn from_env() -> Result<Self> {
        let retry_methods = std::env::var("HTTP_RETRY_METHODS")
            .unwrap_or_else(|_| "GET,HEAD,OPTIONS".to_string())
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            max_attempts: parse_usize("HTTP_MAX_ATTEMPTS", 3)?,
            min_delay_ms: parse_u64("HTTP_MIN_DELAY_MS", 500)?,
            max_delay_ms: parse_u64("HTTP_MAX_DELAY_MS", 30_000)?,
            jitter: parse_f64("HTTP_JITTER", 0.1)?,
            backoff_mult: parse_f64("HTTP_BACKOFF_MULT", 2.0)?,
            retry_methods,
            rate_default_max_requests: parse_usize("HTTP_RATE_DEFAULT_MAX", 60)?,
            rate_default_window_ms: parse_u64("HTTP_RATE_DEFAULT_WINDOW_MS", 60_000)?,
        })
    }
}
