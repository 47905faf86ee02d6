use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per API call (including the first).
    pub max_attempts: u32,
    /// Delay in seconds after an HTTP, transport, or decode failure.
    pub retry_delay_secs: f64,
    /// Delay in seconds after a 429 response.
    pub rate_limit_cooldown_secs: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            retry_delay_secs: 1.0,
            rate_limit_cooldown_secs: 10.0,
        }
    }
}

/// RIPE Stat endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RipeConfig {
    /// Base URL; the data call name and `/data.json` are appended.
    pub base_url: String,
}

impl Default for RipeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://stat.ripe.net/data".to_string(),
        }
    }
}

/// Cloudflare Radar endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudflareConfig {
    /// Base URL of the Radar API.
    pub base_url: String,
    /// Environment variable holding the bearer token.
    pub token_env: String,
}

impl Default for CloudflareConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.cloudflare.com/client/v4/radar".to_string(),
            token_env: "OZI_CLOUDFLARE_API_TOKEN".to_string(),
        }
    }
}

/// Warehouse (SQLite) location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// Database file; None = `~/.local/state/ozi/warehouse.db`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// How the scheduler launches one task. None fields fall back to the running
/// `ozi` binary with the `extract` subcommand.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkerConfig {
    #[serde(default)]
    pub program: Option<PathBuf>,
    #[serde(default)]
    pub args: Option<Vec<String>>,
}

/// Global configuration loaded from `~/.config/ozi/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OziConfig {
    /// Maximum number of tasks the scheduler runs at once.
    pub max_parallel_jobs: usize,
    /// Directory for the scheduler log and per-task logs.
    pub logs_dir: PathBuf,
    /// Records per batch handed to the warehouse.
    pub batch_size: usize,
    /// Inner batch size used to list ASNs per date in nested extraction.
    pub asn_batch_size: usize,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    #[serde(default)]
    pub ripe: RipeConfig,
    #[serde(default)]
    pub cloudflare: CloudflareConfig,
    #[serde(default)]
    pub warehouse: WarehouseConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
}

impl Default for OziConfig {
    fn default() -> Self {
        Self {
            max_parallel_jobs: 10,
            logs_dir: PathBuf::from("logs"),
            batch_size: 1000,
            asn_batch_size: 100,
            retry: None,
            ripe: RipeConfig::default(),
            cloudflare: CloudflareConfig::default(),
            warehouse: WarehouseConfig::default(),
            worker: WorkerConfig::default(),
        }
    }
}

impl OziConfig {
    /// Retry settings, falling back to defaults when the section is absent.
    pub fn retry_config(&self) -> RetryConfig {
        self.retry.clone().unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("ozi")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<OziConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = OziConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from_path(&path)
}

/// Load configuration from an explicit path. The file must exist.
pub fn load_from_path(path: &Path) -> Result<OziConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let cfg: OziConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}
