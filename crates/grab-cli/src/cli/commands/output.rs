//! Shared console output: live progress line and per-attempt summaries.

use grab_core::ledger::AttemptRecord;
use grab_core::progress::BatchProgress;
use grab_core::ticker::Ticker;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

const PROGRESS_INTERVAL: Duration = Duration::from_millis(500);
const MIB: f64 = 1_048_576.0;

/// Prints a progress line to stderr every 500 ms until the ticker is stopped.
pub fn progress_ticker(progress: Arc<BatchProgress>) -> Ticker {
    Ticker::spawn(PROGRESS_INTERVAL, move || {
        let stats = progress.snapshot();
        eprint!(
            "\r  {}/{} done ({:.0}%)  {:.2} MiB  {:.2} MiB/s  ",
            stats.finished,
            stats.total,
            stats.fraction() * 100.0,
            stats.bytes_done as f64 / MIB,
            stats.bytes_per_sec() / MIB
        );
        let _ = std::io::stderr().flush();
    })
}

pub fn print_record(r: &AttemptRecord) {
    if r.is_success() {
        println!("ok    {}", r.url);
        if let Some(path) = &r.filepath {
            println!("      saved to {}", path.display());
        }
        println!(
            "      {:.2} MiB in {:.2}s  {} {}",
            r.size.unwrap_or(0) as f64 / MIB,
            r.elapsed_secs,
            r.algorithm.map(|a| a.as_str()).unwrap_or("digest"),
            r.hash.as_deref().unwrap_or("-")
        );
    } else {
        println!("FAIL  {}", r.url);
        println!("      {}", r.error.as_deref().unwrap_or("unknown error"));
    }
}
