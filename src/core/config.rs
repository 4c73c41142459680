use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

use super::currency::{CurrencyCode, CurrencyPair};

pub const DEFAULT_BASE_URL: &str = "https://api.exchangerate-api.com/v4";
pub const DEFAULT_SOURCE: CurrencyCode = CurrencyCode::Ksh;
pub const DEFAULT_TARGET: CurrencyCode = CurrencyCode::Usd;
pub const DEFAULT_AMOUNT: &str = "10000";
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DefaultsConfig {
    #[serde(default = "default_source")]
    pub source: CurrencyCode,
    #[serde(default = "default_target")]
    pub target: CurrencyCode,
    #[serde(default = "default_amount")]
    pub amount: String,
}

fn default_source() -> CurrencyCode {
    DEFAULT_SOURCE
}

fn default_target() -> CurrencyCode {
    DEFAULT_TARGET
}

fn default_amount() -> String {
    DEFAULT_AMOUNT.to_string()
}

fn default_refresh_interval_secs() -> u64 {
    DEFAULT_REFRESH_INTERVAL_SECS
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        DefaultsConfig {
            source: DEFAULT_SOURCE,
            target: DEFAULT_TARGET,
            amount: DEFAULT_AMOUNT.to_string(),
        }
    }
}

impl DefaultsConfig {
    pub fn pair(&self) -> CurrencyPair {
        CurrencyPair::new(self.source, self.target)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            provider: ProviderConfig::default(),
            defaults: DefaultsConfig::default(),
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
        }
    }
}

impl AppConfig {
    /// Loads the default config file, falling back to built-in defaults when
    /// it does not exist.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using built-in defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "fxlive", "fxlive")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config = Self::from_yaml(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document means "all defaults"
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        if config.refresh_interval_secs == 0 {
            bail!("refresh_interval_secs must be greater than zero");
        }
        Ok(config)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}
