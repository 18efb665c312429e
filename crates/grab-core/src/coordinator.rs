//! Bounded worker pool for a batch of locators.
//!
//! At most `max_workers` fetches run at once. Locators are admitted in input
//! order; outcomes are handed to the caller's callback on the calling thread
//! in completion order. Every locator yields exactly one record, including
//! ones whose worker panicked. Returns only after every task is done.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::FetchError;
use crate::fetch::Fetcher;
use crate::ledger::AttemptRecord;
use crate::locator::ResourceLocator;
use crate::url_model;

/// Final counts for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchTally {
    pub attempts: usize,
    pub successes: usize,
    pub failures: usize,
}

impl BatchTally {
    pub fn record(&mut self, r: &AttemptRecord) {
        self.attempts += 1;
        if r.is_success() {
            self.successes += 1;
        } else {
            self.failures += 1;
        }
    }
}

/// Runs `locators` through `fetcher` on up to `max_workers` threads.
/// `on_outcome` sees each record as soon as its task finishes.
pub fn run_batch<C>(
    fetcher: Arc<dyn Fetcher>,
    locators: Vec<ResourceLocator>,
    max_workers: usize,
    mut on_outcome: C,
) -> BatchTally
where
    C: FnMut(AttemptRecord),
{
    let mut tally = BatchTally::default();
    let count = locators.len();
    if count == 0 {
        return tally;
    }

    let work: Arc<Mutex<VecDeque<(usize, ResourceLocator)>>> =
        Arc::new(Mutex::new(locators.iter().cloned().enumerate().collect()));
    let (tx, rx) = mpsc::channel::<(usize, AttemptRecord)>();
    let num_workers = max_workers.max(1).min(count);
    tracing::debug!(count, workers = num_workers, "batch dispatched");

    let mut handles = Vec::with_capacity(num_workers);
    for _ in 0..num_workers {
        let work = Arc::clone(&work);
        let tx = tx.clone();
        let fetcher = Arc::clone(&fetcher);
        handles.push(std::thread::spawn(move || loop {
            let next = work.lock().unwrap_or_else(|p| p.into_inner()).pop_front();
            let Some((index, locator)) = next else {
                break;
            };
            let record = run_guarded(fetcher.as_ref(), &locator);
            if tx.send((index, record)).is_err() {
                break;
            }
        }));
    }
    drop(tx);

    let mut seen = vec![false; count];
    for (index, record) in rx.iter() {
        seen[index] = true;
        tally.record(&record);
        on_outcome(record);
    }
    for h in handles {
        if h.join().is_err() {
            tracing::warn!("batch worker thread exited abnormally");
        }
    }

    // A worker thread that died outside the guard leaves its task unreported.
    for (index, done) in seen.iter().enumerate() {
        if !done {
            let locator = &locators[index];
            let record = AttemptRecord::failure(
                &locator.url,
                record_name(locator),
                Duration::ZERO,
                FetchError::Panicked("worker exited without an outcome".to_string()).to_string(),
            );
            tally.record(&record);
            on_outcome(record);
        }
    }

    tracing::info!(
        attempts = tally.attempts,
        successes = tally.successes,
        failures = tally.failures,
        "batch finished"
    );
    tally
}

/// Runs one fetch, converting a panic into an Error record.
pub(crate) fn run_guarded(fetcher: &dyn Fetcher, locator: &ResourceLocator) -> AttemptRecord {
    let started = std::time::Instant::now();
    match panic::catch_unwind(AssertUnwindSafe(|| fetcher.fetch(locator))) {
        Ok(record) => record,
        Err(payload) => {
            let msg = panic_message(payload.as_ref());
            tracing::error!(url = %locator.url, panic = %msg, "fetch worker panicked");
            AttemptRecord::failure(
                &locator.url,
                record_name(locator),
                started.elapsed(),
                FetchError::Panicked(msg).to_string(),
            )
        }
    }
}

/// Name recorded when the worker produced no record of its own. Derived
/// names are not probed here.
fn record_name(locator: &ResourceLocator) -> String {
    match &locator.filename {
        Some(name) => url_model::clean_explicit_filename(name),
        None => url_model::derive_filename(&locator.url),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
