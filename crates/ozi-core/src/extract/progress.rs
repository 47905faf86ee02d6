//! Running counters for one extraction run.
//!
//! Shared between the producer (BatchExtractor, blocking thread) and the
//! consumer (warehouse loader, async side), so counts live in atomics.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Point-in-time copy of the counters, for rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionCounters {
    pub dates_processed: u64,
    pub total_dates: u64,
    pub received_from_api: u64,
    pub stored_to_database: u64,
}

impl ExtractionCounters {
    /// Fraction of keys processed in [0.0, 1.0]; 0 when there is nothing to do.
    pub fn fraction(&self) -> f64 {
        if self.total_dates == 0 {
            return 0.0;
        }
        (self.dates_processed as f64 / self.total_dates as f64).min(1.0)
    }
}

#[derive(Default)]
struct Inner {
    dates_processed: AtomicU64,
    total_dates: AtomicU64,
    received_from_api: AtomicU64,
    stored_to_database: AtomicU64,
    current: Mutex<Option<String>>,
}

/// Cloneable handle to the counters of one run. All counts only grow.
#[derive(Clone, Default)]
pub struct ExtractionProgress {
    inner: Arc<Inner>,
}

impl ExtractionProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_total(&self, n: u64) {
        self.inner.total_dates.fetch_add(n, Ordering::Relaxed);
    }

    pub fn key_done(&self) {
        self.inner.dates_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_received(&self, n: u64) {
        self.inner.received_from_api.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_stored(&self, n: u64) {
        self.inner.stored_to_database.fetch_add(n, Ordering::Relaxed);
    }

    /// Label of the key being fetched (usually a date), shown in the bar.
    pub fn set_current(&self, label: impl Into<String>) {
        if let Ok(mut cur) = self.inner.current.lock() {
            *cur = Some(label.into());
        }
    }

    pub fn current(&self) -> Option<String> {
        self.inner.current.lock().ok().and_then(|c| c.clone())
    }

    pub fn snapshot(&self) -> ExtractionCounters {
        ExtractionCounters {
            dates_processed: self.inner.dates_processed.load(Ordering::Relaxed),
            total_dates: self.inner.total_dates.load(Ordering::Relaxed),
            received_from_api: self.inner.received_from_api.load(Ordering::Relaxed),
            stored_to_database: self.inner.stored_to_database.load(Ordering::Relaxed),
        }
    }
}
