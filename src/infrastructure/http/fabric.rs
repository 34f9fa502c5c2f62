//! The HTTP Client Fabric: a single shared [`ClientWithMiddleware`] used by
//! every venue adapter, wrapping retry/backoff/rate-limiting behind one
//! `get_json` call. Grounded on `HttpClientFactory::create_client`'s shape.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde::de::DeserializeOwned;

use super::rate_limiter::RateLimiter;
use super::retry_middleware::RetryMiddleware;
use crate::config::http_config::HttpEnvConfig;
use crate::domain::errors::VenueError;

pub struct HttpFabric {
    client: ClientWithMiddleware,
}

impl HttpFabric {
    pub fn new(config: &HttpEnvConfig) -> Self {
        let limiter = RateLimiter::new(
            config.rate_default_max_requests,
            Duration::from_millis(config.rate_default_window_ms),
        );

        let base = Client::builder()
            .pool_max_idle_per_host(8)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        let client = ClientBuilder::new(base)
            .with(RetryMiddleware::new(limiter, config))
            .build();

        Self { client }
    }

    pub fn raw(&self) -> &ClientWithMiddleware {
        &self.client
    }

    /// GETs `url` and decodes the JSON body, mapping transport/status
    /// failures onto [`VenueError`] so adapters never see reqwest's own
    /// error type.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, VenueError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| VenueError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(if status.is_client_error() {
                VenueError::ClientError {
                    status: status.as_u16(),
                    message: body,
                }
            } else {
                VenueError::Transient {
                    status: status.as_u16(),
                    message: body,
                }
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| VenueError::Malformed(e.to_string()))
    }

    pub async fn get_json_authed<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        bearer_token: &str,
    ) -> Result<T, VenueError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(bearer_token)
            .send()
            .await
            .map_err(|e| VenueError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(if status.is_client_error() {
                VenueError::ClientError {
                    status: status.as_u16(),
                    message: body,
                }
            } else {
                VenueError::Transient {
                    status: status.as_u16(),
                    message: body,
                }
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| VenueError::Malformed(e.to_string()))
    }
}

pub type SharedHttpFabric = Arc<HttpFabric>;
