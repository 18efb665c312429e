//! `grab checksum <path>` – digest a local file.

use anyhow::Result;
use grab_core::checksum::{self, DigestAlgorithm};
use std::path::Path;

pub async fn run_checksum(path: &Path, algorithm: DigestAlgorithm) -> Result<()> {
    let owned = path.to_path_buf();
    let digest = tokio::task::spawn_blocking(move || checksum::digest_path(&owned, algorithm)).await??;
    println!("{}  {}", digest, path.display());
    Ok(())
}
