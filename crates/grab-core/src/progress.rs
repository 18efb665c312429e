//! Live progress counters for a running batch (bytes, finished attempts, rate).
//!
//! Workers bump `bytes_done` as chunks land; the batch driver bumps
//! `finished` as outcomes arrive. Consumers take a [`ProgressStats`] snapshot.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Instant;

/// Shared counters for the batch in flight.
#[derive(Debug)]
pub struct BatchProgress {
    bytes_done: AtomicU64,
    finished: AtomicUsize,
    total: AtomicUsize,
    started: Mutex<Instant>,
}

impl Default for BatchProgress {
    fn default() -> Self {
        Self {
            bytes_done: AtomicU64::new(0),
            finished: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
            started: Mutex::new(Instant::now()),
        }
    }
}

impl BatchProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset counters for a new batch of `total` attempts.
    pub fn begin(&self, total: usize) {
        self.bytes_done.store(0, Ordering::Relaxed);
        self.finished.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
        *self.started.lock().unwrap_or_else(|p| p.into_inner()) = Instant::now();
    }

    pub fn add_bytes(&self, n: u64) {
        self.bytes_done.fetch_add(n, Ordering::Relaxed);
    }

    pub fn finish_one(&self) {
        self.finished.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ProgressStats {
        let started = *self.started.lock().unwrap_or_else(|p| p.into_inner());
        ProgressStats {
            bytes_done: self.bytes_done.load(Ordering::Relaxed),
            finished: self.finished.load(Ordering::Relaxed),
            total: self.total.load(Ordering::Relaxed),
            elapsed_secs: started.elapsed().as_secs_f64(),
        }
    }
}

/// Snapshot of batch progress (CLI-friendly).
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressStats {
    /// Bytes received so far across all workers.
    pub bytes_done: u64,
    /// Attempts that produced an outcome.
    pub finished: usize,
    /// Attempts in the batch.
    pub total: usize,
    /// Seconds since the batch started.
    pub elapsed_secs: f64,
}

impl ProgressStats {
    /// Receive rate in bytes per second (0 if elapsed is 0).
    pub fn bytes_per_sec(&self) -> f64 {
        if self.elapsed_secs <= 0.0 {
            return 0.0;
        }
        self.bytes_done as f64 / self.elapsed_secs
    }

    /// Fraction of attempts finished, in [0.0, 1.0].
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.finished as f64 / self.total as f64).min(1.0)
    }
}
