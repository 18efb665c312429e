//! `grab batch <urls...>` and `grab list <file>` – parallel downloads.

use anyhow::Result;
use grab_core::config::GrabConfig;
use grab_core::{BatchReport, Downloader, ResourceLocator};
use std::path::PathBuf;

use super::output::{print_record, progress_ticker};

/// Where the locators of a batch come from.
enum Source {
    Urls(Vec<ResourceLocator>),
    ListFile(PathBuf),
}

pub async fn run_batch(
    cfg: GrabConfig,
    locators: Vec<ResourceLocator>,
    jobs: Option<usize>,
) -> Result<()> {
    println!("Downloading {} file(s)...", locators.len());
    run(cfg, Source::Urls(locators), jobs).await
}

pub async fn run_list(cfg: GrabConfig, path: PathBuf, jobs: Option<usize>) -> Result<()> {
    println!("Downloading from {}...", path.display());
    run(cfg, Source::ListFile(path), jobs).await
}

async fn run(mut cfg: GrabConfig, source: Source, jobs: Option<usize>) -> Result<()> {
    if let Some(jobs) = jobs {
        cfg.max_workers = jobs;
    }
    let (report, ledger_path) = tokio::task::spawn_blocking(move || -> Result<_> {
        let mut downloader = Downloader::open(&cfg)?;
        let ticker = progress_ticker(downloader.progress());
        let report = match source {
            Source::Urls(locators) => Ok(downloader.fetch_many(locators)),
            Source::ListFile(path) => downloader.fetch_from_list(&path),
        };
        ticker.stop();
        eprintln!();
        Ok((report?, downloader.ledger().path().to_path_buf()))
    })
    .await??;

    print_report(&report);
    match report.persist_error {
        Some(e) => Err(anyhow::Error::new(e)
            .context(format!("download history not saved to {}", ledger_path.display()))),
        None => {
            println!("History: {}", ledger_path.display());
            Ok(())
        }
    }
}

fn print_report(report: &BatchReport) {
    if report.records.is_empty() {
        println!("Nothing to download.");
        return;
    }
    for record in &report.records {
        print_record(record);
    }
    println!(
        "Done: {}/{} downloads succeeded ({} failed)",
        report.tally.successes, report.tally.attempts, report.tally.failures
    );
}
