use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::checksum::DigestAlgorithm;

/// Global configuration loaded from `~/.config/grab/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrabConfig {
    /// Root directory for retrieved content and the ledger file.
    pub download_root: PathBuf,
    /// Maximum number of concurrently active fetch workers in a batch.
    pub max_workers: usize,
    /// Connect timeout for every request, in seconds.
    pub connect_timeout_secs: u64,
    /// A transfer that receives nothing for this long is aborted.
    pub read_timeout_secs: u64,
    /// Timeout for the best-effort HEAD probe used to guess an extension.
    pub probe_timeout_secs: u64,
    /// Digest algorithm recorded in the ledger and used for verification.
    #[serde(default)]
    pub digest_algorithm: DigestAlgorithm,
    /// Optional curl receive buffer size in bytes (None = library default).
    #[serde(default)]
    pub buffer_size: Option<usize>,
    /// Default number of entries shown by `grab history`.
    pub history_limit: usize,
}

impl Default for GrabConfig {
    fn default() -> Self {
        Self {
            download_root: PathBuf::from("downloads"),
            max_workers: 3,
            connect_timeout_secs: 30,
            read_timeout_secs: 30,
            probe_timeout_secs: 5,
            digest_algorithm: DigestAlgorithm::Md5,
            buffer_size: None,
            history_limit: 20,
        }
    }
}

impl GrabConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("grab")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<GrabConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = GrabConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: GrabConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = GrabConfig::default();
        assert_eq!(cfg.download_root, PathBuf::from("downloads"));
        assert_eq!(cfg.max_workers, 3);
        assert_eq!(cfg.connect_timeout(), Duration::from_secs(30));
        assert_eq!(cfg.probe_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.digest_algorithm, DigestAlgorithm::Md5);
        assert_eq!(cfg.history_limit, 20);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = GrabConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: GrabConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.download_root, cfg.download_root);
        assert_eq!(parsed.max_workers, cfg.max_workers);
        assert_eq!(parsed.read_timeout_secs, cfg.read_timeout_secs);
        assert_eq!(parsed.digest_algorithm, cfg.digest_algorithm);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            download_root = "/srv/incoming"
            max_workers = 8
            connect_timeout_secs = 10
            read_timeout_secs = 60
            probe_timeout_secs = 2
            digest_algorithm = "sha256"
            buffer_size = 65536
            history_limit = 50
        "#;
        let cfg: GrabConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.download_root, PathBuf::from("/srv/incoming"));
        assert_eq!(cfg.max_workers, 8);
        assert_eq!(cfg.read_timeout(), Duration::from_secs(60));
        assert_eq!(cfg.digest_algorithm, DigestAlgorithm::Sha256);
        assert_eq!(cfg.buffer_size, Some(65536));
        assert_eq!(cfg.history_limit, 50);
    }

    #[test]
    fn config_toml_optional_fields_default() {
        let toml = r#"
            download_root = "d"
            max_workers = 2
            connect_timeout_secs = 30
            read_timeout_secs = 30
            probe_timeout_secs = 5
            history_limit = 20
        "#;
        let cfg: GrabConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.digest_algorithm, DigestAlgorithm::Md5);
        assert!(cfg.buffer_size.is_none());
    }
}
