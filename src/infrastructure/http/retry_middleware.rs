//! Retry/backoff/rate-limit middleware for the HTTP Fabric.
//!
//! Grounded on `HttpClientFactory`'s client wiring (which used
//! `reqwest-retry`'s generic `ExponentialBackoff` policy), generalized to
//! carry per-host state the stock policy can't: a request budget per host
//! and a cooldown honored from `Retry-After`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use rand::Rng;
use reqwest::{Request, Response, StatusCode};
use reqwest_middleware::{Extensions, Middleware, Next, Result as MwResult};
use tracing::{debug, warn};

/// RFC 7231 `IMF-fixdate`, the form servers send when `Retry-After` isn't a
/// plain seconds count (e.g. `Sun, 06 Nov 1994 08:49:37 GMT`).
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

use super::rate_limiter::RateLimiter;
use crate::config::http_config::HttpEnvConfig;

pub struct RetryMiddleware {
    limiter: Arc<RateLimiter>,
    max_attempts: u32,
    min_delay: Duration,
    max_delay: Duration,
    backoff_mult: f64,
    jitter: f64,
    retry_methods: Vec<String>,
}

impl RetryMiddleware {
    pub fn new(limiter: Arc<RateLimiter>, config: &HttpEnvConfig) -> Self {
        Self {
            limiter,
            max_attempts: config.max_attempts,
            min_delay: Duration::from_millis(config.min_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            backoff_mult: config.backoff_mult,
            jitter: config.jitter,
            retry_methods: config.retry_methods.clone(),
        }
    }

    fn is_retryable_method(&self, req: &Request) -> bool {
        self.retry_methods
            .iter()
            .any(|m| m.eq_ignore_ascii_case(req.method().as_str()))
    }

    fn is_retryable_status(status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
    }

    fn backoff_delay(&self, attempt: u32) -> Duration {
        let base = self.min_delay.as_millis() as f64 * self.backoff_mult.powi(attempt as i32);
        let capped = base.min(self.max_delay.as_millis() as f64);
        let jitter_span = capped * self.jitter;
        let jittered = capped + rand::rng().random_range(-jitter_span..=jitter_span);
        Duration::from_millis(jittered.max(0.0) as u64)
    }

    fn retry_after(response: &Response) -> Option<Duration> {
        let value = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())?;

        if let Ok(secs) = value.parse::<u64>() {
            return Some(Duration::from_secs(secs));
        }

        let target = NaiveDateTime::parse_from_str(value, HTTP_DATE_FORMAT)
            .ok()?
            .and_utc();
        let delta_ms = (target - Utc::now()).num_milliseconds();
        Some(Duration::from_millis(delta_ms.max(0) as u64))
    }
}

#[async_trait]
impl Middleware for RetryMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> MwResult<Response> {
        let host = req.url().host_str().unwrap_or("unknown").to_string();
        let retryable_method = self.is_retryable_method(&req);

        let mut attempt = 0u32;
        loop {
            self.limiter.acquire(&host).await;

            let attempt_req = match req.try_clone() {
                Some(r) => r,
                None => return next.run(req, extensions).await,
            };

            let result = next.clone().run(attempt_req, extensions).await;

            match result {
                Ok(response) => {
                    let status = response.status();
                    if Self::is_retryable_status(status)
                        && retryable_method
                        && attempt + 1 < self.max_attempts
                    {
                        let backoff = self.backoff_delay(attempt);
                        let delay = match Self::retry_after(&response) {
                            Some(retry_after) => retry_after.max(backoff),
                            None => backoff,
                        };
                        if status == StatusCode::TOO_MANY_REQUESTS {
                            self.limiter.set_cooldown(&host, delay).await;
                        }
                        warn!(%host, %status, attempt, ?delay, "retrying request");
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }
                    return Ok(response);
                }
                Err(err) => {
                    if attempt + 1 < self.max_attempts && retryable_method {
                        let delay = self.backoff_delay(attempt);
                        debug!(%host, attempt, ?delay, error = %err, "retrying after transport error");
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(err);
                }
            }
        }
    }
}
