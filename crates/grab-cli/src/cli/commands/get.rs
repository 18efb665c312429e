//! `grab get <url>` – download one URL.

use anyhow::Result;
use grab_core::config::GrabConfig;
use grab_core::{Downloader, FetchReport, ResourceLocator};

use super::output::{print_record, progress_ticker};

pub async fn run_get(cfg: GrabConfig, locator: ResourceLocator) -> Result<()> {
    let report = tokio::task::spawn_blocking(move || -> Result<FetchReport> {
        let mut downloader = Downloader::open(&cfg)?;
        let ticker = progress_ticker(downloader.progress());
        let report = downloader.fetch_one(&locator);
        ticker.stop();
        eprintln!();
        Ok(report)
    })
    .await??;

    let record = report.record;
    print_record(&record);
    if let Some(e) = report.persist_error {
        return Err(anyhow::Error::new(e).context("download history was not saved"));
    }
    if !record.is_success() {
        anyhow::bail!(
            "download failed: {}",
            record.error.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}
