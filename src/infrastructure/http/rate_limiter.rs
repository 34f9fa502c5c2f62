//! Host-partitioned sliding-window limiter. `reqwest-retry`'s
//! `ExponentialBackoff` policy has no notion of "this host", only "this
//! request" — the fabric needs per-host state so one slow venue's cooldown
//! doesn't throttle another, so this is hand-rolled against
//! `reqwest_middleware::Middleware` instead.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::time::sleep;

struct HostWindow {
    hits: VecDeque<Instant>,
    cooldown_until: Option<Instant>,
}

impl HostWindow {
    fn new() -> Self {
        Self {
            hits: VecDeque::new(),
            cooldown_until: None,
        }
    }
}

/// Sliding-window request limiter keyed by request host.
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    hosts: Mutex<HashMap<String, HostWindow>>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Arc<Self> {
        Arc::new(Self {
            max_requests,
            window,
            hosts: Mutex::new(HashMap::new()),
        })
    }

    /// Blocks until a slot opens for `host`, honoring any active
    /// server-requested cooldown (set via [`Self::set_cooldown`]).
    pub async fn acquire(&self, host: &str) {
        loop {
            let wait = {
                let mut hosts = self.hosts.lock().await;
                let entry = hosts.entry(host.to_string()).or_insert_with(HostWindow::new);
                let now = Instant::now();

                if let Some(until) = entry.cooldown_until
                    && now < until
                {
                    Some(until - now)
                } else {
                    entry.cooldown_until = None;
                    while let Some(&front) = entry.hits.front() {
                        if now.duration_since(front) > self.window {
                            entry.hits.pop_front();
                        } else {
                            break;
                        }
                    }
                    if entry.hits.len() < self.max_requests {
                        entry.hits.push_back(now);
                        None
                    } else {
                        let oldest = *entry.hits.front().unwrap();
                        Some(self.window - now.duration_since(oldest))
                    }
                }
            };

            match wait {
                None => return,
                Some(d) => sleep(d).await,
            }
        }
    }

    /// Records a server-requested cooldown (from a `Retry-After` header) for
    /// `host`, blocking every subsequent `acquire` on that host until it
    /// elapses.
    pub async fn set_cooldown(&self, host: &str, duration: Duration) {
        let mut hosts = self.hosts.lock().await;
        let entry = hosts.entry(host.to_string()).or_insert_with(HostWindow::new);
        let until = Instant::now() + duration;
        entry.cooldown_until = Some(entry.cooldown_until.map_or(until, |cur| cur.max(until)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn allows_up_to_the_limit_without_waiting() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let start = Instant::now();
        limiter.acquire("api.example.com").await;
        limiter.acquire("api.example.com").await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn separate_hosts_do_not_share_a_budget() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        limiter.acquire("a.example.com").await;
        let start = Instant::now();
        limiter.acquire("b.example.com").await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
