//! Aggregate statistics derived from the ledger.

use super::record::AttemptRecord;

const MIB: f64 = 1024.0 * 1024.0;

/// Totals over a ledger. Bytes and time count successful attempts only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerStats {
    pub total_attempts: usize,
    pub successes: usize,
    pub failures: usize,
    pub total_bytes: u64,
    pub total_elapsed_secs: f64,
}

impl LedgerStats {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a AttemptRecord>) -> Self {
        let mut stats = LedgerStats::default();
        for r in records {
            stats.total_attempts += 1;
            if r.is_success() {
                stats.successes += 1;
                stats.total_bytes += r.size.unwrap_or(0);
                stats.total_elapsed_secs += r.elapsed_secs;
            } else {
                stats.failures += 1;
            }
        }
        stats
    }

    /// Average throughput in bytes per second; exactly 0 when no time was spent.
    pub fn average_bytes_per_sec(&self) -> f64 {
        if self.total_elapsed_secs <= 0.0 {
            return 0.0;
        }
        self.total_bytes as f64 / self.total_elapsed_secs
    }

    pub fn total_mib(&self) -> f64 {
        self.total_bytes as f64 / MIB
    }

    pub fn average_mib_per_sec(&self) -> f64 {
        self.average_bytes_per_sec() / MIB
    }
}
