//! `grab history` – recent attempts, newest first.

use anyhow::Result;
use grab_core::config::GrabConfig;
use grab_core::ledger::Ledger;

pub fn run_history(cfg: &GrabConfig, limit: Option<usize>) -> Result<()> {
    let ledger = Ledger::load_read_only(Ledger::path_in(&cfg.download_root))?;
    let recent = ledger.recent(limit.unwrap_or(cfg.history_limit));
    if recent.is_empty() {
        println!("No downloads recorded.");
        return Ok(());
    }

    println!("Last {} download(s):", recent.len());
    println!("{:<6} {:<25} {:>10}  {}", "STATUS", "WHEN", "SIZE", "FILE");
    for r in recent {
        let status = if r.is_success() { "ok" } else { "error" };
        let size = r
            .size
            .map(|s| format!("{:.2}M", s as f64 / 1_048_576.0))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<6} {:<25} {:>10}  {}",
            status,
            r.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            size,
            r.filename
        );
        if let Some(err) = &r.error {
            println!("{:<6} {}", "", err);
        }
    }
    Ok(())
}
