use lazy_static::lazy_static;
use prometheus::{register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec, TextEncoder};
use serde::Deserialize;

use crate::catalog::ParseStats;

lazy_static! {
    pub static ref CONVERSIONS: IntCounter = register_int_counter!(
        "m3ucatalog_conversions_total",
        "Number of playlist conversions performed"
    )
    .unwrap();
    pub static ref PLAYLIST_ENTRIES: IntCounterVec = register_int_counter_vec!(
        "m3ucatalog_playlist_entries_total",
        "Playlist entries seen by the converter, by outcome (kept, dropped, orphan)",
        &["outcome"]
    )
    .unwrap();
}

pub fn record_conversion(stats: &ParseStats) {
    CONVERSIONS.inc();
    PLAYLIST_ENTRIES
        .with_label_values(&["kept"])
        .inc_by(stats.channels as u64);
    PLAYLIST_ENTRIES
        .with_label_values(&["dropped"])
        .inc_by(stats.dropped_entries as u64);
    PLAYLIST_ENTRIES
        .with_label_values(&["orphan"])
        .inc_by(stats.orphan_lines as u64);
}

pub fn gather_metrics() -> anyhow::Result<String> {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

#[derive(Debug, Deserialize, Clone)]
pub struct MonitoringConfig {
    #[serde(default = "default_monitoring_enabled")]
    pub enabled: bool,
    /// Log a line with the parse stats for every conversion request.
    #[serde(default = "default_log_conversions")]
    pub log_conversions: bool,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            enabled: default_monitoring_enabled(),
            log_conversions: default_log_conversions(),
        }
    }
}

fn default_monitoring_enabled() -> bool {
    true
}

fn default_log_conversions() -> bool {
    false
}
