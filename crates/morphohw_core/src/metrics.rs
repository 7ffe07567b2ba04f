//! Run metrics and structured logging for the engine.
//!
//! Counters are atomic so a grid can be observed through a shared
//! reference while it is not stepping.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// How often tick summaries are logged at info level.
const TICK_LOG_INTERVAL: u64 = 100;

/// Point-in-time copy of all counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricCounts {
    pub ticks: u64,
    pub configure_commands: u64,
    pub tfs_created: u64,
    pub morphogens_scheduled: u64,
    pub tf_binds: u64,
    pub polymerase_recruitments: u64,
}

/// Counters collected while a grid runs.
pub struct Metrics {
    tick_count: AtomicU64,
    configure_commands: AtomicU64,
    tfs_created: AtomicU64,
    morphogens_scheduled: AtomicU64,
    tf_binds: AtomicU64,
    polymerase_recruitments: AtomicU64,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").field("counts", &self.counts()).finish()
    }
}

impl Metrics {
    /// Creates a new metrics collector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tick_count: AtomicU64::new(0),
            configure_commands: AtomicU64::new(0),
            tfs_created: AtomicU64::new(0),
            morphogens_scheduled: AtomicU64::new(0),
            tf_binds: AtomicU64::new(0),
            polymerase_recruitments: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Records a completed tick with its duration.
    pub fn record_tick(&self, duration: Duration, tick: u64, active_genes: usize) {
        let count = self.tick_count.fetch_add(1, Ordering::Relaxed) + 1;
        if count % TICK_LOG_INTERVAL == 0 {
            tracing::info!(
                tick,
                active_genes,
                configure_commands = self.configure_commands.load(Ordering::Relaxed),
                duration_us = duration.as_micros() as u64,
                "Morphogenesis tick"
            );
        }
    }

    pub fn record_configure(&self) {
        self.configure_commands.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_tf_created(&self) {
        self.tfs_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_morphogens(&self, deliveries: usize) {
        self.morphogens_scheduled
            .fetch_add(deliveries as u64, Ordering::Relaxed);
    }

    pub fn record_tf_bind(&self) {
        self.tf_binds.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_recruitment(&self) {
        self.polymerase_recruitments.fetch_add(1, Ordering::Relaxed);
    }

    /// Gets the number of ticks recorded.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn counts(&self) -> MetricCounts {
        MetricCounts {
            ticks: self.tick_count.load(Ordering::Relaxed),
            configure_commands: self.configure_commands.load(Ordering::Relaxed),
            tfs_created: self.tfs_created.load(Ordering::Relaxed),
            morphogens_scheduled: self.morphogens_scheduled.load(Ordering::Relaxed),
            tf_binds: self.tf_binds.load(Ordering::Relaxed),
            polymerase_recruitments: self.polymerase_recruitments.load(Ordering::Relaxed),
        }
    }

    /// Gets elapsed time since metrics creation.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Initialize tracing subscriber for logging.
pub fn init_logging() {
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(tracing::Level::INFO)
            .finish(),
    )
    .ok();
}
