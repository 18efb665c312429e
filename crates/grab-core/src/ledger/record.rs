//! One persisted outcome of a single fetch attempt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::checksum::DigestAlgorithm;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptStatus {
    Success,
    Error,
}

/// Ledger entry. Success records carry path, size and digest; error records carry the cause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub timestamp: DateTime<Utc>,
    pub url: String,
    /// Requested or derived name, before collision suffixes.
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filepath: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<DigestAlgorithm>,
    /// Wall time of the attempt in seconds, millisecond precision.
    pub elapsed_secs: f64,
    pub status: AttemptStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AttemptRecord {
    pub fn success(
        url: impl Into<String>,
        filename: impl Into<String>,
        filepath: PathBuf,
        size: u64,
        hash: String,
        algorithm: DigestAlgorithm,
        elapsed: Duration,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            url: url.into(),
            filename: filename.into(),
            filepath: Some(filepath),
            size: Some(size),
            hash: Some(hash),
            algorithm: Some(algorithm),
            elapsed_secs: round_millis(elapsed),
            status: AttemptStatus::Success,
            error: None,
        }
    }

    pub fn failure(
        url: impl Into<String>,
        filename: impl Into<String>,
        elapsed: Duration,
        error: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            url: url.into(),
            filename: filename.into(),
            filepath: None,
            size: None,
            hash: None,
            algorithm: None,
            elapsed_secs: round_millis(elapsed),
            status: AttemptStatus::Error,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == AttemptStatus::Success
    }
}

fn round_millis(d: Duration) -> f64 {
    (d.as_secs_f64() * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_record_json_shape() {
        let r = AttemptRecord::success(
            "https://example.com/a.bin",
            "a.bin",
            PathBuf::from("/dl/a.bin"),
            42,
            "abc".to_string(),
            DigestAlgorithm::Md5,
            Duration::from_millis(1234),
        );
        let v: serde_json::Value = serde_json::to_value(&r).unwrap();
        assert_eq!(v["status"], "success");
        assert_eq!(v["size"], 42);
        assert_eq!(v["algorithm"], "md5");
        assert_eq!(v["elapsed_secs"], 1.234);
        assert!(v.get("error").is_none());
    }

    #[test]
    fn error_record_omits_success_fields() {
        let r = AttemptRecord::failure(
            "https://example.com/x",
            "x",
            Duration::from_micros(1500),
            "HTTP 404",
        );
        let v: serde_json::Value = serde_json::to_value(&r).unwrap();
        assert_eq!(v["status"], "error");
        assert_eq!(v["error"], "HTTP 404");
        assert_eq!(v["elapsed_secs"], 0.002);
        for key in ["filepath", "size", "hash", "algorithm"] {
            assert!(v.get(key).is_none(), "{key} should be omitted");
        }
        assert!(!r.is_success());
    }
}
