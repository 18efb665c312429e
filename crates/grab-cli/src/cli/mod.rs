//! CLI for the grab download manager.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use grab_core::checksum::DigestAlgorithm;
use grab_core::config;
use grab_core::ResourceLocator;
use std::path::PathBuf;

use commands::{run_batch, run_checksum, run_get, run_history, run_list, run_stats};

/// Top-level CLI for the grab download manager.
#[derive(Debug, Parser)]
#[command(name = "grab")]
#[command(about = "grab: parallel, checksum-verified downloads with a durable history", long_about = None)]
pub struct Cli {
    /// Download root (overrides `download_root` from config.toml).
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a single URL.
    Get {
        /// HTTP/HTTPS URL to download.
        url: String,
        /// File name to save as (derived from the URL when omitted).
        #[arg(long)]
        name: Option<String>,
        /// Subfolder under the download root.
        #[arg(long)]
        folder: Option<PathBuf>,
        /// Expected hex digest; the file is deleted if it does not match.
        #[arg(long, value_name = "DIGEST")]
        expect: Option<String>,
    },

    /// Download several URLs in parallel.
    Batch {
        /// URLs to download.
        #[arg(required = true)]
        urls: Vec<String>,
        /// Maximum simultaneous downloads (default from config).
        #[arg(long, value_name = "N")]
        jobs: Option<usize>,
        /// Subfolder under the download root for every URL.
        #[arg(long)]
        folder: Option<PathBuf>,
    },

    /// Download every URL listed in a text file (one per line, `#` comments).
    List {
        /// Path to the list file.
        path: PathBuf,
        /// Maximum simultaneous downloads (default from config).
        #[arg(long, value_name = "N")]
        jobs: Option<usize>,
    },

    /// Show recent attempts, newest first.
    History {
        /// Number of entries to show (default from config).
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
    },

    /// Show aggregate statistics over all recorded attempts.
    Stats,

    /// Compute the digest of a local file.
    Checksum {
        /// Path to the file.
        path: PathBuf,
        /// Digest algorithm: md5 or sha256.
        #[arg(long, default_value = "md5")]
        algorithm: DigestAlgorithm,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = config::load_or_init()?;
        if let Some(root) = cli.root {
            cfg.download_root = root;
        }
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Get {
                url,
                name,
                folder,
                expect,
            } => {
                let mut locator = ResourceLocator::new(url);
                if let Some(name) = name {
                    locator = locator.with_filename(name);
                }
                if let Some(folder) = folder {
                    locator = locator.with_folder(folder);
                }
                if let Some(digest) = expect {
                    locator = locator.with_expected_digest(digest);
                }
                run_get(cfg, locator).await?
            }
            CliCommand::Batch { urls, jobs, folder } => {
                let locators = urls
                    .into_iter()
                    .map(|u| match &folder {
                        Some(f) => ResourceLocator::new(u).with_folder(f.clone()),
                        None => ResourceLocator::new(u),
                    })
                    .collect();
                run_batch(cfg, locators, jobs).await?
            }
            CliCommand::List { path, jobs } => run_list(cfg, path, jobs).await?,
            CliCommand::History { limit } => run_history(&cfg, limit)?,
            CliCommand::Stats => run_stats(&cfg)?,
            CliCommand::Checksum { path, algorithm } => run_checksum(&path, algorithm).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
