//! Single-stream HTTP GET written sequentially to a destination file.

use std::cell::{Cell, RefCell};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str;
use std::sync::Arc;
use std::time::Duration;

use crate::error::FetchError;
use crate::progress::BatchProgress;

/// Transport knobs shared by every transfer of a downloader.
#[derive(Debug, Clone, Copy)]
pub struct TransferOptions {
    pub connect_timeout: Duration,
    /// Abort when nothing arrives for this long.
    pub read_timeout: Duration,
    pub buffer_size: Option<usize>,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(30),
            buffer_size: None,
        }
    }
}

/// Downloads `url` into `dest` (truncating it). Returns the number of bytes written.
/// Chunks are reported to `progress` as they land.
pub(crate) fn download_to_file(
    url: &str,
    dest: &Path,
    opts: TransferOptions,
    progress: Option<&Arc<BatchProgress>>,
) -> Result<u64, FetchError> {
    let file = File::create(dest).map_err(|e| FetchError::storage(dest, e))?;
    let writer = RefCell::new(BufWriter::new(file));
    let written = Cell::new(0u64);
    let write_error: RefCell<Option<std::io::Error>> = RefCell::new(None);
    let content_length: Cell<Option<u64>> = Cell::new(None);
    // Status of the response currently streaming; 0 until a status line arrives.
    let status: Cell<u32> = Cell::new(0);

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    if let Some(sz) = opts.buffer_size {
        easy.buffer_size(sz)?;
    }
    easy.connect_timeout(opts.connect_timeout)?;
    easy.low_speed_limit(1)?;
    easy.low_speed_time(opts.read_timeout)?;

    let performed = {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(line) = str::from_utf8(data) {
                // Each redirect hop starts with a fresh status line.
                if line.starts_with("HTTP/") {
                    content_length.set(None);
                    status.set(status_code(line).unwrap_or(0));
                } else if let Some((name, value)) = line.split_once(':') {
                    if name.trim().eq_ignore_ascii_case("content-length") {
                        content_length.set(value.trim().parse().ok());
                    }
                }
            }
            true
        })?;
        transfer.write_function(|data| {
            if let Err(e) = writer.borrow_mut().write_all(data) {
                *write_error.borrow_mut() = Some(e);
                return Ok(0); // abort transfer
            }
            written.set(written.get() + data.len() as u64);
            if let Some(p) = progress.filter(|_| is_success(status.get())) {
                p.add_bytes(data.len() as u64);
            }
            Ok(data.len())
        })?;
        transfer.perform()
    };

    if let Some(e) = write_error.into_inner() {
        return Err(FetchError::storage(dest, e));
    }
    performed?;

    let code = easy.response_code()?;
    if !is_success(code) {
        return Err(FetchError::Http(code));
    }

    let mut writer = writer.into_inner();
    writer.flush().map_err(|e| FetchError::storage(dest, e))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| FetchError::storage(dest, e))?;

    let written = written.get();
    if let Some(expected) = content_length.get() {
        if written < expected {
            tracing::warn!(url, expected, written, "body shorter than Content-Length");
        }
    }
    Ok(written)
}

/// 2xx, or 0 for schemes without HTTP status (file://).
fn is_success(code: u32) -> bool {
    code == 0 || (200..300).contains(&code)
}

/// Status code from a line like `HTTP/1.1 404 Not Found`.
fn status_code(line: &str) -> Option<u32> {
    line.split_whitespace().nth(1)?.parse().ok()
}
