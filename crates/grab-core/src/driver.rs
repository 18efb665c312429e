//! Batch driver: "fetch one" and "fetch many" over a single owned ledger.
//!
//! Workers never touch the ledger. Every record funnels back to the thread
//! that owns the [`Downloader`], which alone calls [`Ledger::append`].

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use crate::config::GrabConfig;
use crate::coordinator::{self, BatchTally};
use crate::error::LedgerError;
use crate::fetch::{FetchWorker, Fetcher, TransferOptions};
use crate::ledger::{AttemptRecord, Ledger};
use crate::locator::{self, ResourceLocator};
use crate::probe::{CurlProbe, MetadataProbe, NoProbe};
use crate::progress::BatchProgress;
use crate::resolver::DestinationResolver;

/// Result of a batch: counts plus the records in completion order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub tally: BatchTally,
    pub records: Vec<AttemptRecord>,
    /// First ledger persist failure, if any. The attempts above happened
    /// regardless and are held in the in-memory ledger.
    pub persist_error: Option<LedgerError>,
}

/// Result of a single fetch.
#[derive(Debug)]
pub struct FetchReport {
    pub record: AttemptRecord,
    pub persist_error: Option<LedgerError>,
}

pub struct Downloader {
    max_workers: usize,
    ledger: Ledger,
    fetcher: Arc<dyn Fetcher>,
    progress: Arc<BatchProgress>,
}

impl Downloader {
    /// Build a downloader from config: creates the root, loads its ledger,
    /// and wires the curl fetcher with a HEAD probe (none when
    /// `probe_timeout_secs` is 0).
    pub fn open(cfg: &GrabConfig) -> Result<Self> {
        let probe: Arc<dyn MetadataProbe> = if cfg.probe_timeout_secs == 0 {
            Arc::new(NoProbe)
        } else {
            Arc::new(CurlProbe::new(cfg.probe_timeout()))
        };
        let transfer = TransferOptions {
            connect_timeout: cfg.connect_timeout(),
            read_timeout: cfg.read_timeout(),
            buffer_size: cfg.buffer_size,
        };
        let progress = Arc::new(BatchProgress::new());
        let fetcher = FetchWorker::new(
            &cfg.download_root,
            Arc::new(DestinationResolver::new()),
            probe,
            transfer,
            cfg.digest_algorithm,
        )
        .with_progress(Arc::clone(&progress));
        Self::with_fetcher(&cfg.download_root, cfg.max_workers, Arc::new(fetcher), progress)
    }

    /// Build a downloader around any fetcher (tests, alternative transports).
    pub fn with_fetcher(
        root: &Path,
        max_workers: usize,
        fetcher: Arc<dyn Fetcher>,
        progress: Arc<BatchProgress>,
    ) -> Result<Self> {
        std::fs::create_dir_all(root)
            .with_context(|| format!("create download root {}", root.display()))?;
        let ledger = Ledger::load(Ledger::path_in(root));
        tracing::debug!(root = %root.display(), records = ledger.len(), "downloader ready");
        Ok(Self {
            max_workers: max_workers.max(1),
            ledger,
            fetcher,
            progress,
        })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Live counters for the batch in flight.
    pub fn progress(&self) -> Arc<BatchProgress> {
        Arc::clone(&self.progress)
    }

    /// Fetch a single locator on the calling thread and append its record.
    pub fn fetch_one(&mut self, locator: &ResourceLocator) -> FetchReport {
        self.progress.begin(1);
        let record = coordinator::run_guarded(self.fetcher.as_ref(), locator);
        self.progress.finish_one();
        let persist_error = self.ledger.append(record.clone()).err();
        if let Some(e) = &persist_error {
            tracing::error!(error = %e, "ledger persist failed");
        }
        FetchReport {
            record,
            persist_error,
        }
    }

    /// Fetch many with the configured parallelism. Each record is appended
    /// as it completes. A persist failure does not stop the batch; the first
    /// one is carried in the report.
    pub fn fetch_many(&mut self, locators: Vec<ResourceLocator>) -> BatchReport {
        self.progress.begin(locators.len());
        let mut records = Vec::with_capacity(locators.len());
        let mut persist_error: Option<LedgerError> = None;
        let ledger = &mut self.ledger;
        let progress = &self.progress;

        let tally = coordinator::run_batch(
            Arc::clone(&self.fetcher),
            locators,
            self.max_workers,
            |record| {
                progress.finish_one();
                if let Err(e) = ledger.append(record.clone()) {
                    tracing::error!(error = %e, "ledger persist failed");
                    persist_error.get_or_insert(e);
                }
                records.push(record);
            },
        );

        BatchReport {
            tally,
            records,
            persist_error,
        }
    }

    /// Fetch every locator listed in `path` (one URL per line).
    pub fn fetch_from_list(&mut self, path: &Path) -> Result<BatchReport> {
        let locators = locator::read_list(path)?;
        tracing::info!(list = %path.display(), count = locators.len(), "fetching from list");
        Ok(self.fetch_many(locators))
    }
}
