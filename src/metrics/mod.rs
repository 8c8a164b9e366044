// Private module declaration
mod server;

use prometheus::{Histogram, HistogramOpts, IntCounterVec, IntGauge, Opts, Registry};

pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for the ingestion path
// ============================================================================
//
// - Webhook deliveries by event name
// - Dispatch outcomes and latency
// - Hub notifications by channel and result
// - Hub circuit breaker state
//
// Served on /metrics of the metrics port.
// ============================================================================

pub struct Metrics {
    registry: Registry,

    pub events_received: IntCounterVec,
    pub dispatch_outcomes: IntCounterVec,
    pub dispatch_duration: Histogram,

    pub hub_notifications: IntCounterVec,
    pub hub_circuit_breaker_state: IntGauge,
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let events_received = IntCounterVec::new(
            Opts::new("webhook_events_received_total", "Webhook deliveries received"),
            &["event_name"],
        )?;
        registry.register(Box::new(events_received.clone()))?;

        let dispatch_outcomes = IntCounterVec::new(
            Opts::new("webhook_dispatch_outcomes_total", "Dispatch results by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(dispatch_outcomes.clone()))?;

        let dispatch_duration = Histogram::with_opts(
            HistogramOpts::new("webhook_dispatch_duration_seconds", "Time spent dispatching one event")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        )?;
        registry.register(Box::new(dispatch_duration.clone()))?;

        let hub_notifications = IntCounterVec::new(
            Opts::new("hub_notifications_total", "Messages published to the hub"),
            &["channel", "result"],
        )?;
        registry.register(Box::new(hub_notifications.clone()))?;

        let hub_circuit_breaker_state = IntGauge::new(
            "hub_circuit_breaker_state",
            "Hub publisher circuit state (0=Closed, 1=Open, 2=HalfOpen)",
        )?;
        registry.register(Box::new(hub_circuit_breaker_state.clone()))?;

        Ok(Self {
            registry,
            events_received,
            dispatch_outcomes,
            dispatch_duration,
            hub_notifications,
            hub_circuit_breaker_state,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_received(&self, event_name: &str) {
        self.events_received.with_label_values(&[event_name]).inc();
    }

    /// `outcome` is a `DispatchOutcome::as_str()` value or "error"
    pub fn record_dispatch(&self, outcome: &str, duration_secs: f64) {
        self.dispatch_outcomes.with_label_values(&[outcome]).inc();
        self.dispatch_duration.observe(duration_secs);
    }

    pub fn record_notification(&self, channel: &str, delivered: bool) {
        let result = if delivered { "delivered" } else { "failed" };
        self.hub_notifications.with_label_values(&[channel, result]).inc();
    }

    pub fn set_breaker_state(&self, value: i64) {
        self.hub_circuit_breaker_state.set(value);
    }
}
