//! `grab stats` – aggregate statistics over the ledger.

use anyhow::Result;
use grab_core::config::GrabConfig;
use grab_core::ledger::Ledger;

pub fn run_stats(cfg: &GrabConfig) -> Result<()> {
    let ledger = Ledger::load_read_only(Ledger::path_in(&cfg.download_root))?;
    if ledger.is_empty() {
        println!("No downloads recorded.");
        return Ok(());
    }
    let s = ledger.stats();
    println!("Total attempts:  {}", s.total_attempts);
    println!("Succeeded:       {}", s.successes);
    println!("Failed:          {}", s.failures);
    println!("Total size:      {:.2} MiB", s.total_mib());
    println!("Total time:      {:.2}s", s.total_elapsed_secs);
    println!("Average speed:   {:.2} MiB/s", s.average_mib_per_sec());
    Ok(())
}
