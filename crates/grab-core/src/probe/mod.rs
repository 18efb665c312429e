//! Best-effort HEAD probe for metadata hints.
//!
//! The destination resolver asks for a `Content-Type` when a derived name has
//! no extension. Every way the probe can end is a [`ProbeOutcome`] value; a
//! failed probe is an ordinary outcome the caller consumes, not an error.

mod parse;

use std::str;
use std::time::Duration;

use parse::HeadMetadata;

/// Result of a metadata probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The server answered and sent a `Content-Type`.
    ContentType(String),
    /// The server answered without a `Content-Type`.
    NoContentType,
    /// The probe could not complete (transport error, non-2xx, bad URL).
    Failed(String),
}

/// Seam for the resolver: anything that can produce a [`ProbeOutcome`] for a URL.
pub trait MetadataProbe: Send + Sync {
    fn probe(&self, url: &str) -> ProbeOutcome;
}

/// HEAD probe over libcurl.
#[derive(Debug, Clone)]
pub struct CurlProbe {
    timeout: Duration,
}

impl CurlProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl MetadataProbe for CurlProbe {
    fn probe(&self, url: &str) -> ProbeOutcome {
        match head(url, self.timeout) {
            Ok(meta) => match meta.content_type {
                Some(ct) if !ct.is_empty() => ProbeOutcome::ContentType(ct),
                _ => ProbeOutcome::NoContentType,
            },
            Err(reason) => ProbeOutcome::Failed(reason),
        }
    }
}

/// Probe that never touches the network; used when `probe_timeout_secs` is 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProbe;

impl MetadataProbe for NoProbe {
    fn probe(&self, _url: &str) -> ProbeOutcome {
        ProbeOutcome::Failed("probing disabled".to_string())
    }
}

/// Performs a HEAD request and returns the parsed headers of the final response.
/// Follows redirects. Runs in the current thread.
fn head(url: &str, timeout: Duration) -> Result<HeadMetadata, String> {
    let mut headers: Vec<String> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    let setup = (|| -> Result<(), curl::Error> {
        easy.url(url)?;
        easy.nobody(true)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(timeout)?;
        easy.timeout(timeout)?;
        Ok(())
    })();
    setup.map_err(|e| e.to_string())?;

    {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    let line = s.trim_end();
                    // A new status line starts a new response (redirect hop).
                    if line.starts_with("HTTP/") {
                        headers.clear();
                    }
                    headers.push(line.to_string());
                }
                true
            })
            .map_err(|e| e.to_string())?;
        transfer.perform().map_err(|e| e.to_string())?;
    }

    let code = easy.response_code().map_err(|e| e.to_string())?;
    if code != 0 && !(200..300).contains(&code) {
        return Err(format!("HEAD returned HTTP {}", code));
    }

    Ok(parse::parse_headers(&headers))
}
