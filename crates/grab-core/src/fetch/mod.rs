//! Fetch worker: one blocking retrieval of one locator.
//!
//! resolve destination → stream body to disk → digest → optional verify.
//! Every exit produces exactly one [`AttemptRecord`]; failures are captured
//! here and never reach sibling workers. There is no retry.

mod transfer;

pub use transfer::TransferOptions;

use std::fs::File;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::checksum::{self, DigestAlgorithm};
use crate::error::FetchError;
use crate::ledger::AttemptRecord;
use crate::locator::ResourceLocator;
use crate::probe::MetadataProbe;
use crate::progress::BatchProgress;
use crate::resolver::DestinationResolver;

/// Anything that turns a locator into an attempt record. The coordinator
/// schedules values of this trait; tests substitute their own.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, locator: &ResourceLocator) -> AttemptRecord;
}

/// What a successful transfer produced.
#[derive(Debug)]
struct Retrieved {
    path: PathBuf,
    size: u64,
    digest: String,
}

/// Removes a reserved destination when dropped unless [`Reservation::keep`]
/// was called, so early returns and unwinding panics leave no file behind.
struct Reservation<'a> {
    path: &'a Path,
    keep: bool,
}

impl<'a> Reservation<'a> {
    fn new(path: &'a Path) -> Self {
        Self { path, keep: false }
    }

    fn keep(mut self) {
        self.keep = true;
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if self.keep {
            return;
        }
        if let Err(e) = std::fs::remove_file(self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "could not remove failed download");
        }
    }
}

/// The production fetcher: curl transfer into a reserved destination under `root`.
pub struct FetchWorker {
    root: PathBuf,
    resolver: Arc<DestinationResolver>,
    probe: Arc<dyn MetadataProbe>,
    transfer: TransferOptions,
    algorithm: DigestAlgorithm,
    progress: Option<Arc<BatchProgress>>,
}

impl FetchWorker {
    pub fn new(
        root: impl Into<PathBuf>,
        resolver: Arc<DestinationResolver>,
        probe: Arc<dyn MetadataProbe>,
        transfer: TransferOptions,
        algorithm: DigestAlgorithm,
    ) -> Self {
        Self {
            root: root.into(),
            resolver,
            probe,
            transfer,
            algorithm,
            progress: None,
        }
    }

    /// Report received bytes to `progress`.
    pub fn with_progress(mut self, progress: Arc<BatchProgress>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Target folder for a locator: the root, or a relative subfolder of it.
    /// Absolute paths and `..` components in the hint are dropped.
    fn destination_folder(&self, locator: &ResourceLocator) -> PathBuf {
        let mut folder = self.root.clone();
        if let Some(sub) = &locator.folder {
            for c in sub.components() {
                if let Component::Normal(part) = c {
                    folder.push(part);
                }
            }
        }
        folder
    }

    fn retrieve(&self, locator: &ResourceLocator, name: &str) -> Result<Retrieved, FetchError> {
        let folder = self.destination_folder(locator);
        let path = self
            .resolver
            .reserve(&folder, name)
            .map_err(|e| FetchError::storage(&folder, e))?;
        tracing::debug!(url = %locator.url, path = %path.display(), "destination reserved");

        let reservation = Reservation::new(&path);
        let retrieved = self.transfer_and_verify(locator, &path)?;
        reservation.keep();
        Ok(retrieved)
    }

    fn transfer_and_verify(
        &self,
        locator: &ResourceLocator,
        path: &Path,
    ) -> Result<Retrieved, FetchError> {
        transfer::download_to_file(&locator.url, path, self.transfer, self.progress.as_ref())?;

        let size = std::fs::metadata(path)
            .map_err(|e| FetchError::storage(path, e))?
            .len();
        let file = File::open(path).map_err(|e| FetchError::storage(path, e))?;
        let digest =
            checksum::digest_reader(file, self.algorithm).map_err(|e| FetchError::storage(path, e))?;

        if let Some(expected) = &locator.expected_digest {
            if !checksum::digests_match(&digest, expected) {
                return Err(FetchError::Verification {
                    expected: expected.trim().to_ascii_lowercase(),
                    actual: digest,
                });
            }
        }

        Ok(Retrieved {
            path: path.to_path_buf(),
            size,
            digest,
        })
    }
}

impl Fetcher for FetchWorker {
    fn fetch(&self, locator: &ResourceLocator) -> AttemptRecord {
        let started = Instant::now();
        let name = self.resolver.propose_name(
            locator.filename.as_deref(),
            &locator.url,
            self.probe.as_ref(),
        );
        tracing::info!(url = %locator.url, name = %name, "fetch started");

        match self.retrieve(locator, &name) {
            Ok(r) => {
                let elapsed = started.elapsed();
                tracing::info!(
                    url = %locator.url,
                    path = %r.path.display(),
                    size = r.size,
                    elapsed_ms = elapsed.as_millis() as u64,
                    digest = %r.digest,
                    "fetch completed"
                );
                AttemptRecord::success(
                    &locator.url,
                    name,
                    absolute(&r.path),
                    r.size,
                    r.digest,
                    self.algorithm,
                    elapsed,
                )
            }
            Err(e) => {
                tracing::warn!(url = %locator.url, error = %e, "fetch failed");
                AttemptRecord::failure(&locator.url, name, started.elapsed(), e.to_string())
            }
        }
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::AttemptStatus;
    use crate::probe::NoProbe;
    use std::time::Duration;

    fn worker(root: &Path) -> FetchWorker {
        FetchWorker::new(
            root,
            Arc::new(DestinationResolver::new()),
            Arc::new(NoProbe),
            TransferOptions {
                connect_timeout: Duration::from_secs(2),
                read_timeout: Duration::from_secs(2),
                buffer_size: None,
            },
            DigestAlgorithm::Md5,
        )
    }

    #[test]
    fn subfolder_hint_stays_under_root() {
        let w = worker(Path::new("/dl"));
        let l = ResourceLocator::new("https://e.example/x").with_folder("../../etc/./cron.d");
        assert_eq!(w.destination_folder(&l), PathBuf::from("/dl/etc/cron.d"));
        let l = ResourceLocator::new("https://e.example/x").with_folder("/abs/path");
        assert_eq!(w.destination_folder(&l), PathBuf::from("/dl/abs/path"));
        let l = ResourceLocator::new("https://e.example/x");
        assert_eq!(w.destination_folder(&l), PathBuf::from("/dl"));
    }

    #[test]
    fn unreachable_host_yields_error_record_and_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let w = worker(dir.path());
        let rec = w.fetch(&ResourceLocator::new("http://127.0.0.1:1/file.bin"));
        assert_eq!(rec.status, AttemptStatus::Error);
        assert_eq!(rec.filename, "file.bin");
        assert!(rec.error.as_deref().unwrap().starts_with("transport error"));
        assert!(rec.filepath.is_none());
        assert!(!dir.path().join("file.bin").exists());
    }

    #[test]
    fn local_file_url_is_fetched_and_digested() {
        let src = tempfile::tempdir().unwrap();
        let src_path = src.path().join("payload.txt");
        std::fs::write(&src_path, b"hello\n").unwrap();
        let url = url::Url::from_file_path(&src_path).unwrap().to_string();

        let dir = tempfile::tempdir().unwrap();
        let rec = worker(dir.path()).fetch(&ResourceLocator::new(url));
        assert_eq!(rec.status, AttemptStatus::Success, "{:?}", rec.error);
        assert_eq!(rec.size, Some(6));
        assert_eq!(rec.hash.as_deref(), Some("b1946ac92492d2347c6235b4d2611184"));
        assert_eq!(
            std::fs::read(dir.path().join("payload.txt")).unwrap(),
            b"hello\n"
        );
    }

    #[test]
    fn unwritable_folder_yields_storage_error_record() {
        let src = tempfile::tempdir().unwrap();
        let src_path = src.path().join("payload.txt");
        std::fs::write(&src_path, b"hello\n").unwrap();
        let url = url::Url::from_file_path(&src_path).unwrap().to_string();

        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a folder").unwrap();
        let rec = worker(dir.path()).fetch(&ResourceLocator::new(url).with_folder("blocker"));

        assert_eq!(rec.status, AttemptStatus::Error);
        let err = rec.error.as_deref().unwrap();
        assert!(err.starts_with("storage error: "), "{err}");
        assert!(err.contains("blocker"), "{err}");
        assert!(rec.filepath.is_none());
        assert_eq!(std::fs::read(&blocker).unwrap(), b"not a folder");
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn dropped_reservation_removes_file_even_on_panic() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = DestinationResolver::new();
        let path = resolver.reserve(dir.path(), "partial.bin").unwrap();
        let result = std::panic::catch_unwind(|| {
            let _reservation = Reservation::new(&path);
            panic!("transfer blew up");
        });
        assert!(result.is_err());
        assert!(!path.exists());

        let kept = resolver.reserve(dir.path(), "partial.bin").unwrap();
        assert_eq!(kept, dir.path().join("partial.bin"));
        Reservation::new(&kept).keep();
        assert!(kept.exists());
    }

    #[test]
    fn digest_mismatch_removes_file() {
        let src = tempfile::tempdir().unwrap();
        let src_path = src.path().join("payload.txt");
        std::fs::write(&src_path, b"hello\n").unwrap();
        let url = url::Url::from_file_path(&src_path).unwrap().to_string();

        let dir = tempfile::tempdir().unwrap();
        let rec = worker(dir.path())
            .fetch(&ResourceLocator::new(url).with_expected_digest("00000000000000000000000000000000"));
        assert_eq!(rec.status, AttemptStatus::Error);
        assert!(rec.error.as_deref().unwrap().starts_with("checksum mismatch"));
        assert!(!dir.path().join("payload.txt").exists());
    }
}
