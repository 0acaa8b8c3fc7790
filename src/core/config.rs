use super::rate::RoundingLaw;
use super::schedule::DailySchedule;
use super::store::DocumentKey;
use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

/// Overrides `provider.api_key` from the config file when set.
pub const API_KEY_ENV: &str = "GOLDRATE_API_KEY";

#[derive(Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub base_currency: String,
    pub symbol: String,
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            base_url: "https://api.metalpriceapi.com/v1".to_string(),
            api_key: None,
            base_currency: "INR".to_string(),
            symbol: "XAU".to_string(),
            timeout_secs: 30,
        }
    }
}

// Keeps the key out of `debug!("{config:#?}")`
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_currency", &self.base_currency)
            .field("symbol", &self.symbol)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ScheduleConfig {
    pub time: String,
    pub utc_offset: String,
    pub run_timeout_secs: u64,
    pub run_on_start: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        ScheduleConfig {
            time: "09:00".to_string(),
            utc_offset: "+05:30".to_string(),
            run_timeout_secs: 120,
            run_on_start: false,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SnapshotConfig {
    pub collection: String,
    pub document: String,
    pub unit: String,
    pub source: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        SnapshotConfig {
            collection: "goldRates".to_string(),
            document: "india".to_string(),
            unit: "INR/gram".to_string(),
            source: "metalpriceapi".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub rounding: RoundingLaw,
    pub data_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "goldrate", "goldrate")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("com", "goldrate", "goldrate")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Rejects settings that would make every run fail or never finish.
    pub fn validate(&self) -> Result<()> {
        if self.provider.timeout_secs == 0 {
            bail!("provider.timeout_secs must be greater than zero");
        }
        if self.schedule.run_timeout_secs == 0 {
            bail!("schedule.run_timeout_secs must be greater than zero");
        }
        self.daily_schedule()?;
        Ok(())
    }

    /// The provider key, preferring the environment over the file.
    pub fn api_key(&self) -> Option<String> {
        resolve_api_key(std::env::var(API_KEY_ENV).ok(), self.provider.api_key.clone())
    }

    pub fn daily_schedule(&self) -> Result<DailySchedule> {
        DailySchedule::parse(&self.schedule.time, &self.schedule.utc_offset)
    }

    pub fn document_key(&self) -> DocumentKey {
        DocumentKey::new(&self.snapshot.collection, &self.snapshot.document)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.provider.timeout_secs)
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.schedule.run_timeout_secs)
    }
}

fn resolve_api_key(from_env: Option<String>, from_file: Option<String>) -> Option<String> {
    from_env
        .into_iter()
        .chain(from_file)
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
}
