//! Metrics collection.
//!
//! # Metrics
//! - `pow_host_lookups_total` (counter): lookups by outcome (`matched`, `default`, `none`, `error`)
//! - `pow_root_scans_total` (counter): host-root scans by outcome (`ok`, `error`)
//! - `pow_root_scan_entries` (gauge): applications found by the latest scan
//! - `pow_root_scan_skipped_total` (counter): entries skipped during scans
//! - `pow_root_scan_duration_seconds` (histogram): scan latency
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; installing an exporter is the
//!   embedding process's job
//! - Updates are cheap no-ops when no recorder is installed

use std::time::Duration;

use metrics::{counter, gauge, histogram};

pub fn record_lookup(outcome: &'static str) {
    counter!("pow_host_lookups_total", "outcome" => outcome).increment(1);
}

pub fn record_scan(found: usize, skipped: usize, elapsed: Duration) {
    counter!("pow_root_scans_total", "outcome" => "ok").increment(1);
    gauge!("pow_root_scan_entries").set(found as f64);
    counter!("pow_root_scan_skipped_total").increment(skipped as u64);
    histogram!("pow_root_scan_duration_seconds").record(elapsed.as_secs_f64());
}

pub fn record_scan_failure() {
    counter!("pow_root_scans_total", "outcome" => "error").increment(1);
}
