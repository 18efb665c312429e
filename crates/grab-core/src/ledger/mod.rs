//! Durable, ordered record of every fetch attempt.
//!
//! The ledger is a JSON array of [`AttemptRecord`] under the download root.
//! It is loaded once; every [`Ledger::append`] rewrites the whole file
//! (temp file + rename). A ledger value has one owner and is never mutated
//! from several threads.

mod record;
mod stats;

pub use record::{AttemptRecord, AttemptStatus};
pub use stats::LedgerStats;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::LedgerError;

/// File name of the ledger inside the download root.
pub const LEDGER_FILE_NAME: &str = "download_history.json";

#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    records: Vec<AttemptRecord>,
    /// Set when an existing store could be neither read nor moved aside;
    /// saving would destroy it.
    persist_blocked: bool,
}

impl Ledger {
    /// Ledger stored at `<root>/download_history.json`.
    pub fn path_in(root: &Path) -> PathBuf {
        root.join(LEDGER_FILE_NAME)
    }

    /// Empty ledger bound to `path`; nothing is read or written.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Vec::new(),
            persist_blocked: false,
        }
    }

    /// Load the persisted sequence for appending. A missing store yields an
    /// empty ledger. A store that cannot be read or parsed is moved aside to
    /// `<file>.corrupt` and also yields an empty ledger; if it cannot be moved,
    /// every later save fails instead of overwriting it.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match read_records(&path) {
            Ok(Some(records)) => {
                tracing::debug!(path = %path.display(), count = records.len(), "ledger loaded");
                Self {
                    path,
                    records,
                    persist_blocked: false,
                }
            }
            Ok(None) => Self::empty(path),
            Err(e) => {
                let backup = with_suffix(&path, ".corrupt");
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    backup = %backup.display(),
                    "ledger unusable; starting empty"
                );
                let mut ledger = Self::empty(path);
                if let Err(e) = std::fs::rename(&ledger.path, &backup) {
                    tracing::error!(error = %e, "could not move ledger aside; persisting disabled");
                    ledger.persist_blocked = true;
                }
                ledger
            }
        }
    }

    /// Load for viewing only: nothing on disk is renamed or written. A missing
    /// store is empty; an unreadable or corrupt one is an error.
    pub fn load_read_only(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();
        let records = read_records(&path)?.unwrap_or_default();
        Ok(Self {
            path,
            records,
            persist_blocked: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[AttemptRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Add one record and persist the full sequence. The record stays in memory
    /// even if persisting fails; the error is returned so it is not lost silently.
    pub fn append(&mut self, record: AttemptRecord) -> Result<(), LedgerError> {
        self.records.push(record);
        self.save()
    }

    /// Write the full sequence, replacing the previous snapshot.
    pub fn save(&self) -> Result<(), LedgerError> {
        if self.persist_blocked {
            return Err(LedgerError::Unreadable {
                path: self.path.clone(),
            });
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| LedgerError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let mut json = serde_json::to_string_pretty(&self.records)?;
        json.push('\n');

        let tmp = with_suffix(&self.path, ".tmp");
        std::fs::write(&tmp, json).map_err(|source| LedgerError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| LedgerError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(())
    }

    /// Up to `limit` most recent records, newest first.
    pub fn recent(&self, limit: usize) -> Vec<&AttemptRecord> {
        self.records().iter().rev().take(limit).collect()
    }

    pub fn stats(&self) -> LedgerStats {
        LedgerStats::from_records(self.records())
    }
}

/// `Ok(None)` when the store does not exist yet.
fn read_records(path: &Path) -> Result<Option<Vec<AttemptRecord>>, LedgerError> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(LedgerError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    Ok(Some(serde_json::from_slice(&bytes)?))
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}
