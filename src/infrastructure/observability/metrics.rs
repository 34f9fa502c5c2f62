//! Prometheus metrics definitions.
//!
//! All metrics use the `agentcore_` prefix and are read-only outside this
//! module; every counter/gauge is updated by exactly one engine.

use prometheus::{
    Counter, CounterVec, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Cron job runs, labeled by job kind and outcome ("ok"/"error").
    pub jobs_total: CounterVec,
    /// Job execution latency, labeled by job kind.
    pub job_duration_seconds: HistogramVec,
    pub alerts_evaluated_total: Counter,
    pub alerts_triggered_total: Counter,
    pub portfolio_syncs_total: CounterVec,
    pub stop_loss_triggers_total: CounterVec,
    pub market_index_entries: Gauge,
    pub http_retries_total: CounterVec,
    pub uptime_seconds: Gauge,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let jobs_total = CounterVec::new(
            Opts::new("agentcore_jobs_total", "Cron job runs by kind and outcome"),
            &["kind", "outcome"],
        )?;
        registry.register(Box::new(jobs_total.clone()))?;

        let job_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "agentcore_job_duration_seconds",
                "Cron job execution latency in seconds",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 15.0, 60.0]),
            &["kind"],
        )?;
        registry.register(Box::new(job_duration_seconds.clone()))?;

        let alerts_evaluated_total = Counter::with_opts(Opts::new(
            "agentcore_alerts_evaluated_total",
            "Total alert condition evaluations",
        ))?;
        registry.register(Box::new(alerts_evaluated_total.clone()))?;

        let alerts_triggered_total = Counter::with_opts(Opts::new(
            "agentcore_alerts_triggered_total",
            "Total alert conditions that fired",
        ))?;
        registry.register(Box::new(alerts_triggered_total.clone()))?;

        let portfolio_syncs_total = CounterVec::new(
            Opts::new(
                "agentcore_portfolio_syncs_total",
                "Portfolio reconciliation runs by outcome",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(portfolio_syncs_total.clone()))?;

        let stop_loss_triggers_total = CounterVec::new(
            Opts::new(
                "agentcore_stop_loss_triggers_total",
                "Stop-loss evaluations by resulting status",
            ),
            &["status"],
        )?;
        registry.register(Box::new(stop_loss_triggers_total.clone()))?;

        let market_index_entries = Gauge::with_opts(Opts::new(
            "agentcore_market_index_entries",
            "Entries currently held in the semantic market index",
        ))?;
        registry.register(Box::new(market_index_entries.clone()))?;

        let http_retries_total = CounterVec::new(
            Opts::new("agentcore_http_retries_total", "HTTP fabric retries by host"),
            &["host"],
        )?;
        registry.register(Box::new(http_retries_total.clone()))?;

        let uptime_seconds = Gauge::with_opts(Opts::new(
            "agentcore_uptime_seconds",
            "Process uptime in seconds",
        ))?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            jobs_total,
            job_duration_seconds,
            alerts_evaluated_total,
            alerts_triggered_total,
            portfolio_syncs_total,
            stop_loss_triggers_total,
            market_index_entries,
            http_retries_total,
            uptime_seconds,
        })
    }

    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    pub fn record_job(&self, kind: &str, outcome: &str, duration_secs: f64) {
        self.jobs_total.with_label_values(&[kind, outcome]).inc();
        self.job_duration_seconds
            .with_label_values(&[kind])
            .observe(duration_secs);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("failed to construct default Metrics")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_with_agentcore_prefix() {
        let metrics = Metrics::new().unwrap();
        assert!(metrics.render().contains("agentcore_"));
    }

    #[test]
    fn record_job_updates_both_series() {
        let metrics = Metrics::new().unwrap();
        metrics.record_job("alert_scan", "ok", 0.25);
        let output = metrics.render();
        assert!(output.contains("agentcore_jobs_total"));
        assert!(output.contains("agentcore_job_duration_seconds"));
    }
}
