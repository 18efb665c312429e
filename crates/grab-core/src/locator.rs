//! Caller-supplied descriptions of resources to retrieve, and list-file parsing.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// One resource to fetch: a URL plus optional naming, placement and integrity hints.
/// Immutable once built; consumed by exactly one fetch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLocator {
    pub url: String,
    /// Explicit filename; derived from the URL when absent.
    pub filename: Option<String>,
    /// Subfolder under the download root.
    pub folder: Option<PathBuf>,
    /// Expected hex digest; a mismatch fails the attempt and removes the file.
    pub expected_digest: Option<String>,
}

impl ResourceLocator {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            filename: None,
            folder: None,
            expected_digest: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into()).filter(|s: &String| !s.trim().is_empty());
        self
    }

    pub fn with_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        let folder = folder.into();
        self.folder = if folder.as_os_str().is_empty() {
            None
        } else {
            Some(folder)
        };
        self
    }

    pub fn with_expected_digest(mut self, digest: impl Into<String>) -> Self {
        self.expected_digest = Some(digest.into()).filter(|s: &String| !s.trim().is_empty());
        self
    }
}

impl From<&str> for ResourceLocator {
    fn from(url: &str) -> Self {
        ResourceLocator::new(url)
    }
}

impl From<String> for ResourceLocator {
    fn from(url: String) -> Self {
        ResourceLocator::new(url)
    }
}

/// Parse list-file text: one URL per line, blank lines and `#` comments skipped.
pub fn parse_list(text: &str) -> Vec<ResourceLocator> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ResourceLocator::new)
        .collect()
}

/// Read and parse a list file. A missing or unreadable file is an error.
pub fn read_list(path: &Path) -> Result<Vec<ResourceLocator>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read list file {}", path.display()))?;
    Ok(parse_list(&text))
}
