use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder. Safe to call more than once; only
/// the first call installs.
pub fn init_metrics() {
    if METRICS_HANDLE.get().is_some() {
        return;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = METRICS_HANDLE.set(handle);
        }
        Err(e) => tracing::warn!(error = %e, "Prometheus recorder not installed"),
    }
}

pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

pub fn record_order_created(order_type: &'static str) {
    metrics::counter!("orders_created_total", "order_type" => order_type).increment(1);
}

pub fn record_charge_failure() {
    metrics::counter!("order_charge_failures_total").increment(1);
}

pub fn record_persist_critical() {
    metrics::counter!("order_persist_critical_total").increment(1);
}

pub fn record_webhook(outcome: &'static str) {
    metrics::counter!("webhook_notifications_total", "outcome" => outcome).increment(1);
}
