//! Typed failures for a single fetch attempt and for the ledger store.

use std::path::PathBuf;

/// Why one attempt failed. Captured per task and turned into an Error record;
/// never propagated past the worker that produced it.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// libcurl reported a failure (refused, timeout, DNS, TLS, ...).
    #[error("transport error: {0}")]
    Transport(#[from] curl::Error),
    /// The server answered with a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Retrieved content does not have the caller-supplied digest.
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    Verification { expected: String, actual: String },
    /// Destination folder or file could not be created or written.
    #[error("storage error: {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The worker panicked; the coordinator converts the payload to text.
    #[error("worker panicked: {0}")]
    Panicked(String),
}

impl FetchError {
    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FetchError::Storage {
            path: path.into(),
            source,
        }
    }
}

/// Failure to persist the ledger. This is the one class surfaced to the caller of a batch.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger I/O on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("ledger JSON: {0}")]
    Serialize(#[from] serde_json::Error),
    /// The existing store could not be read nor moved aside.
    #[error("ledger {path} could not be read or moved aside; refusing to overwrite it")]
    Unreadable { path: PathBuf },
}
