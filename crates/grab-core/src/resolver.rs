//! Destination resolution: turns a proposed filename into a collision-free path.
//!
//! Names come from the caller or the locator's URL path (see [`crate::url_model`]).
//! Extensionless names derived from the URL may get one from a best-effort
//! [`MetadataProbe`]; caller-supplied names are never probed.
//! Collisions are resolved with `_1`, `_2`, ... before the last extension.
//!
//! Resolution for one folder is serialized by a per-folder lock and the chosen
//! path is reserved with an exclusive create before the lock is released, so
//! concurrent workers never receive the same path.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::probe::{MetadataProbe, ProbeOutcome};
use crate::url_model::{self, extension_for_content_type};

/// Upper bound on numeric suffixes tried before giving up.
const MAX_SUFFIX: u32 = 100_000;

/// Resolves and reserves destination paths; shared by all workers of a downloader.
#[derive(Default)]
pub struct DestinationResolver {
    folder_locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl DestinationResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick the name for `url`. An explicit name is only sanitized. Otherwise
    /// the URL's last path segment (or the default stem) is used, and an
    /// extensionless result is probed for a content type.
    pub fn propose_name(
        &self,
        requested: Option<&str>,
        url: &str,
        probe: &dyn MetadataProbe,
    ) -> String {
        if let Some(r) = requested {
            return url_model::clean_explicit_filename(r);
        }
        let name = url_model::derive_filename(url);
        if url_model::has_extension(&name) {
            return name;
        }
        match probe.probe(url) {
            ProbeOutcome::ContentType(ct) => match extension_for_content_type(&ct) {
                Some(ext) => {
                    tracing::debug!(url, content_type = %ct, ext, "extension from probe");
                    format!("{}.{}", name, ext)
                }
                None => {
                    tracing::debug!(url, content_type = %ct, "no extension for content type");
                    name
                }
            },
            ProbeOutcome::NoContentType => {
                tracing::debug!(url, "probe returned no content type");
                name
            }
            ProbeOutcome::Failed(reason) => {
                tracing::debug!(url, %reason, "probe failed; keeping name extensionless");
                name
            }
        }
    }

    /// Reserve a path for `name` inside `folder` (created if missing).
    /// The returned file exists (empty) and belongs to the caller; it never
    /// existed before the call.
    pub fn reserve(&self, folder: &Path, name: &str) -> io::Result<PathBuf> {
        std::fs::create_dir_all(folder)?;
        let lock = self.folder_lock(folder);
        let _guard = lock.lock().unwrap_or_else(|p| p.into_inner());

        let (stem, ext) = split_name(name);
        for n in 0..=MAX_SUFFIX {
            let candidate = folder.join(candidate_name(stem, ext, n));
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
            {
                Ok(_) => {
                    if n > 0 {
                        tracing::debug!(
                            requested = name,
                            chosen = %candidate.display(),
                            "name collision resolved"
                        );
                    }
                    return Ok(candidate);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            }
        }
        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free name for {} in {}", name, folder.display()),
        ))
    }

    fn folder_lock(&self, folder: &Path) -> Arc<Mutex<()>> {
        let key = std::fs::canonicalize(folder).unwrap_or_else(|_| folder.to_path_buf());
        let mut locks = self.folder_locks.lock().unwrap_or_else(|p| p.into_inner());
        Arc::clone(locks.entry(key).or_default())
    }
}

/// Split at the last extension: `archive.tar.gz` → (`archive.tar`, Some(`gz`)).
fn split_name(name: &str) -> (&str, Option<&str>) {
    let path = Path::new(name);
    match (path.file_stem().and_then(|s| s.to_str()), path.extension().and_then(|e| e.to_str())) {
        (Some(stem), Some(ext)) => (stem, Some(ext)),
        _ => (name, None),
    }
}

fn candidate_name(stem: &str, ext: Option<&str>, n: u32) -> String {
    match (n, ext) {
        (0, Some(ext)) => format!("{}.{}", stem, ext),
        (0, None) => stem.to_string(),
        (n, Some(ext)) => format!("{}_{}.{}", stem, n, ext),
        (n, None) => format!("{}_{}", stem, n),
    }
}
