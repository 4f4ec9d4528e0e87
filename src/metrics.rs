//! Prometheus metrics collection for pvoiced.
//!
//! Exposed on an optional HTTP endpoint (see [`crate::http`]).
//!
//! - `pvoice_command_total{command}` - Commands dispatched by type
//! - `pvoice_command_duration_seconds{command}` - Command latency histogram
//! - `pvoice_command_errors_total{command,error}` - Failed commands
//! - `pvoice_active_channels` - Tracked private channels (gauge)
//! - `pvoice_channels_deleted_total{reason}` - Deletions by cause
//! - `pvoice_gateway_errors_total{operation,error}` - Failed platform calls
//! - `pvoice_cache_misses_total{entity}` - Cache misses recovered by refetch

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::{Once, OnceLock};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters
// ========================================================================

/// Commands processed by type.
pub static COMMAND_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();

/// Command errors by type and error kind.
pub static COMMAND_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

/// Private channels created.
pub static CHANNELS_CREATED: OnceLock<IntCounter> = OnceLock::new();

/// Channels deleted, by reason.
pub static CHANNELS_DELETED: OnceLock<IntCounterVec> = OnceLock::new();

pub static GATEWAY_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

pub static CACHE_MISSES: OnceLock<IntCounterVec> = OnceLock::new();

// ========================================================================
// Gauges and histograms
// ========================================================================

/// Tracked private channels.
pub static ACTIVE_CHANNELS: OnceLock<IntGauge> = OnceLock::new();

/// Command processing latency by command type.
pub static COMMAND_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Called once at startup before any metrics are recorded. Metrics that
/// fail to build are skipped; recording into them is a no-op. Repeat calls
/// wait for the first to finish and then return.
pub fn init() {
    static INIT: Once = Once::new();
    INIT.call_once(register_all);
}

fn register_all() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if let Err(e) = r.register(Box::new(m.clone())) {
                        tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                    }
                    let _ = $metric.set(m);
                }
                Err(e) => {
                    tracing::warn!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                }
            }
        };
    }

    register!(COMMAND_COUNTER, IntCounterVec::new(Opts::new("pvoice_command_total", "Commands processed by type"), &["command"]));
    register!(COMMAND_LATENCY, HistogramVec::new(
        HistogramOpts::new("pvoice_command_duration_seconds", "Command latency by type")
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        &["command"]));
    register!(COMMAND_ERRORS, IntCounterVec::new(Opts::new("pvoice_command_errors_total", "Command errors by type"), &["command", "error"]));
    register!(ACTIVE_CHANNELS, IntGauge::new("pvoice_active_channels", "Tracked private voice channels"));
    register!(CHANNELS_CREATED, IntCounter::new("pvoice_channels_created_total", "Private voice channels created"));
    register!(CHANNELS_DELETED, IntCounterVec::new(Opts::new("pvoice_channels_deleted_total", "Voice channels deleted by reason"), &["reason"]));
    register!(GATEWAY_ERRORS, IntCounterVec::new(Opts::new("pvoice_gateway_errors_total", "Failed platform calls"), &["operation", "error"]));
    register!(CACHE_MISSES, IntCounterVec::new(Opts::new("pvoice_cache_misses_total", "Cache misses recovered by a direct fetch"), &["entity"]));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Recording helpers
// ============================================================================

/// Record a command execution with latency.
#[inline]
pub fn record_command(command: &str, duration_secs: f64) {
    if let Some(c) = COMMAND_COUNTER.get() {
        c.with_label_values(&[command]).inc();
    }
    if let Some(h) = COMMAND_LATENCY.get() {
        h.with_label_values(&[command]).observe(duration_secs);
    }
}

/// Record a command error.
#[inline]
pub fn record_command_error(command: &str, error: &str) {
    if let Some(c) = COMMAND_ERRORS.get() {
        c.with_label_values(&[command, error]).inc();
    }
}

#[inline]
pub fn set_active_channels(count: usize) {
    if let Some(g) = ACTIVE_CHANNELS.get() {
        g.set(count as i64);
    }
}

#[inline]
pub fn record_channel_created() {
    if let Some(c) = CHANNELS_CREATED.get() {
        c.inc();
    }
}

#[inline]
pub fn record_channel_deleted(reason: &str) {
    if let Some(c) = CHANNELS_DELETED.get() {
        c.with_label_values(&[reason]).inc();
    }
}

#[inline]
pub fn record_gateway_error(operation: &str, error: &str) {
    if let Some(c) = GATEWAY_ERRORS.get() {
        c.with_label_values(&[operation, error]).inc();
    }
}

#[inline]
pub fn record_cache_miss(entity: &str) {
    if let Some(c) = CACHE_MISSES.get() {
        c.with_label_values(&[entity]).inc();
    }
}
