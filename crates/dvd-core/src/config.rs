use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

/// Default download directory, relative to the serve root.
pub const DEFAULT_DOWNLOAD_PATH: &str = "DriveVideos";

/// Session lifetime parameters (optional section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Sessions without admitted candidates or touches for this long are evicted.
    pub ttl_secs: u64,
    /// Interval between staleness sweeps.
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 30 * 60,
            sweep_interval_secs: 60,
        }
    }
}

/// Global configuration loaded from `~/.config/dvd/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DvdConfig {
    /// Destination directory for downloads. Relative paths resolve against the serve root.
    #[serde(default = "default_download_path")]
    pub download_path: String,
    /// Start the paired download as soon as a session has both streams.
    #[serde(default)]
    pub auto_download: bool,
    /// Optional session lifetime section; if missing, built-in defaults are used.
    #[serde(default)]
    pub sessions: Option<SessionConfig>,
}

fn default_download_path() -> String {
    DEFAULT_DOWNLOAD_PATH.to_string()
}

impl Default for DvdConfig {
    fn default() -> Self {
        Self {
            download_path: default_download_path(),
            auto_download: false,
            sessions: None,
        }
    }
}

impl DvdConfig {
    /// Replaces blank values with their defaults.
    pub fn normalized(mut self) -> Self {
        if self.download_path.trim().is_empty() {
            self.download_path = default_download_path();
        }
        self
    }

    /// Download directory: `download_path` as-is when absolute, else under `root`.
    pub fn download_dir(&self, root: &Path) -> PathBuf {
        let p = Path::new(self.download_path.trim());
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            root.join(p)
        }
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.sessions.clone().unwrap_or_default().ttl_secs)
    }

    /// Sweep interval, at least one second.
    pub fn sweep_interval(&self) -> Duration {
        let secs = self.sessions.clone().unwrap_or_default().sweep_interval_secs;
        Duration::from_secs(secs.max(1))
    }
}

/// Persisted user configuration.
pub trait ConfigStore: Send + Sync {
    fn load(&self) -> Result<DvdConfig>;
    fn save(&self, config: &DvdConfig) -> Result<()>;
}

/// TOML file store; a missing file is created with defaults on first load.
#[derive(Debug, Clone)]
pub struct TomlConfigStore {
    path: PathBuf,
}

impl TomlConfigStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `~/.config/dvd/config.toml`.
    pub fn default_location() -> Result<Self> {
        Ok(Self::at(config_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for TomlConfigStore {
    fn load(&self) -> Result<DvdConfig> {
        if !self.path.exists() {
            let default_cfg = DvdConfig::default();
            self.save(&default_cfg)?;
            tracing::info!("created default config at {}", self.path.display());
            return Ok(default_cfg);
        }
        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("read config: {}", self.path.display()))?;
        let cfg: DvdConfig = toml::from_str(&data)
            .with_context(|| format!("parse config: {}", self.path.display()))?;
        Ok(cfg.normalized())
    }

    fn save(&self, config: &DvdConfig) -> Result<()> {
        let toml = toml::to_string_pretty(config)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, toml)
            .with_context(|| format!("write config: {}", self.path.display()))?;
        Ok(())
    }
}

/// In-process store, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    config: Mutex<DvdConfig>,
}

impl MemoryConfigStore {
    pub fn new(config: DvdConfig) -> Self {
        Self {
            config: Mutex::new(config),
        }
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> Result<DvdConfig> {
        let cfg = self
            .config
            .lock()
            .map_err(|_| anyhow::anyhow!("config lock poisoned"))?;
        Ok(cfg.clone())
    }

    fn save(&self, config: &DvdConfig) -> Result<()> {
        let mut cfg = self
            .config
            .lock()
            .map_err(|_| anyhow::anyhow!("config lock poisoned"))?;
        *cfg = config.clone();
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("dvd")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from the default location, creating a default file if none exists.
pub fn load_or_init() -> Result<DvdConfig> {
    TomlConfigStore::default_location()?.load()
}
