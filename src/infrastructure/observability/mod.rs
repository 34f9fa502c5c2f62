//! Push-based observability: outbound-only metrics, no HTTP server.
//!
//! 1. Structured JSON logs (periodic snapshot to stdout, for Loki/Fluentd/CloudWatch).
//! 2. In-process Prometheus registry, rendered on demand by whatever scrapes it.
//!
//! This system only sends data; it never accepts requests.

pub mod metrics;
pub mod reporter;

pub use metrics::Metrics;
pub use reporter::MetricsReporter;
