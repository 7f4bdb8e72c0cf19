//! Spawn pass metrics and logging setup.
//!
//! Provides structured logging and counters for monitoring how much the
//! spawner produces and where its attempts are rejected.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Passes between two periodic summaries.
const SUMMARY_INTERVAL: u64 = 100;

/// Collector for spawn pass statistics.
pub struct Metrics {
    pass_count: AtomicU64,
    requests_total: AtomicU64,
    last_requests: AtomicU64,
    defects: AtomicU64,
    pub counters: Mutex<HashMap<String, AtomicU64>>,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pass_count: AtomicU64::new(0),
            requests_total: AtomicU64::new(0),
            last_requests: AtomicU64::new(0),
            defects: AtomicU64::new(0),
            counters: Mutex::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Records a finished spawn pass.
    pub fn record_pass(
        &self,
        duration: Duration,
        requests: usize,
        active_regions: usize,
        defects: usize,
    ) {
        self.pass_count.fetch_add(1, Ordering::Relaxed);
        self.requests_total
            .fetch_add(requests as u64, Ordering::Relaxed);
        self.last_requests.store(requests as u64, Ordering::Relaxed);
        self.defects.fetch_add(defects as u64, Ordering::Relaxed);

        let pass = self.pass_count.load(Ordering::Relaxed);
        if pass % SUMMARY_INTERVAL == 0 {
            tracing::info!(
                pass = pass,
                requests = requests,
                requests_total = self.requests_total.load(Ordering::Relaxed),
                active_regions = active_regions,
                duration_us = duration.as_micros() as u64,
                "Spawn pass summary"
            );
        }
    }

    /// Increments a named counter.
    pub fn increment_counter(&self, name: &str) {
        self.add_to_counter(name, 1);
    }

    pub fn add_to_counter(&self, name: &str, amount: u64) {
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(amount, Ordering::Relaxed);
    }

    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        let counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .get(name)
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }

    #[must_use]
    pub fn pass_count(&self) -> u64 {
        self.pass_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn requests_total(&self) -> u64 {
        self.requests_total.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn last_requests(&self) -> u64 {
        self.last_requests.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn defects(&self) -> u64 {
        self.defects.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Initialize tracing subscriber for logging. `RUST_LOG` overrides the
/// default `info` level.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(filter)
            .finish(),
    )
    .ok();
}
