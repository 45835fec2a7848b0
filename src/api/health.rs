//! Shared health state for the /health endpoint.
//! Updated by the snapshot gateway on every upstream fetch.

use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU64, Ordering};

use chrono::Utc;

/// Upstream feed health. Gateway writes, API reads.
#[derive(Default)]
pub struct HealthState {
    /// Millisecond timestamp of the last successful fetch (0 = none).
    pub last_success_at_ms: AtomicU64,
    /// HTTP status of the most recent upstream response (0 = none, or no response).
    pub last_status: AtomicU16,
    /// Whether the most recent fetch produced a usable snapshot.
    pub last_fetch_ok: AtomicBool,
    pub fetch_count: AtomicU64,
    pub failure_count: AtomicU64,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self) {
        self.fetch_count.fetch_add(1, Ordering::Relaxed);
        let now_ms = Utc::now().timestamp_millis().max(0) as u64;
        self.last_success_at_ms.store(now_ms, Ordering::Relaxed);
        self.last_fetch_ok.store(true, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.fetch_count.fetch_add(1, Ordering::Relaxed);
        self.failure_count.fetch_add(1, Ordering::Relaxed);
        self.last_fetch_ok.store(false, Ordering::Relaxed);
    }

    pub fn set_last_status(&self, status: u16) {
        self.last_status.store(status, Ordering::Relaxed);
    }

    pub fn last_success_at_ms(&self) -> u64 {
        self.last_success_at_ms.load(Ordering::Relaxed)
    }

    pub fn last_status(&self) -> u16 {
        self.last_status.load(Ordering::Relaxed)
    }

    pub fn fetch_count(&self) -> u64 {
        self.fetch_count.load(Ordering::Relaxed)
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    /// True when the latest fetch decoded a snapshot.
    pub fn upstream_ok(&self) -> bool {
        self.last_fetch_ok.load(Ordering::Relaxed)
    }
}
