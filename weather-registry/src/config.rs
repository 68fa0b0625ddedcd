use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::Path, path::PathBuf, time::Duration};

use crate::{model::GeoCandidate, provider::ProviderId, scheduler::DEFAULT_REFRESH_INTERVAL};

/// Environment variable naming the provider to use, overriding the file.
pub const PROVIDER_ENV: &str = "WEATHER_PROVIDER";

/// Longest refresh period honored; larger configured values are clamped to it.
pub const MAX_REFRESH_INTERVAL_HOURS: u64 = 24 * 366;

const SECS_PER_HOUR: u64 = 60 * 60;

/// Configuration for a single provider (e.g., API key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,

    /// Override of the provider's API root, e.g. for a proxy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Optional default provider id, e.g. "openweather" or "weatherapi".
    pub default_provider: Option<String>,

    /// HTTP timeout for provider calls.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Period of the background refresh.
    #[serde(default = "default_refresh_interval_hours")]
    pub refresh_interval_hours: u64,

    /// Example TOML:
    /// [providers.weatherapi]
    /// api_key = "..."
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// Locations registered before the first query.
    #[serde(default = "default_seed_locations")]
    pub seed_locations: Vec<GeoCandidate>,
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_refresh_interval_hours() -> u64 {
    DEFAULT_REFRESH_INTERVAL.as_secs() / SECS_PER_HOUR
}

fn default_seed_locations() -> Vec<GeoCandidate> {
    vec![GeoCandidate::default_seed()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_provider: None,
            timeout_secs: default_timeout_secs(),
            refresh_interval_hours: default_refresh_interval_hours(),
            providers: HashMap::new(),
            seed_locations: default_seed_locations(),
        }
    }
}

impl Config {
    /// Return the default provider, falling back to WeatherAPI.com when unset.
    pub fn default_provider_id(&self) -> Result<ProviderId> {
        match self.default_provider.as_deref() {
            Some(s) => ProviderId::try_from(s),
            None => Ok(ProviderId::WeatherApi),
        }
    }

    pub fn provider_config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    /// Store default provider as string.
    pub fn set_default_provider(&mut self, id: ProviderId) {
        self.default_provider = Some(id.as_str().to_string());
    }

    /// Refresh period, clamped to `1..=MAX_REFRESH_INTERVAL_HOURS` hours.
    pub fn refresh_interval(&self) -> Duration {
        let hours = self.refresh_interval_hours.clamp(1, MAX_REFRESH_INTERVAL_HOURS);
        if hours != self.refresh_interval_hours {
            tracing::warn!(
                configured = self.refresh_interval_hours,
                used = hours,
                "refresh_interval_hours out of range, clamping"
            );
        }
        Duration::from_secs(hours * SECS_PER_HOUR)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-registry")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Apply `WEATHER_PROVIDER` and per-provider API key variables from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|name| std::env::var(name).ok())
    }

    /// Same as [`Config::apply_env_overrides`] with an injectable lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(provider) = lookup(PROVIDER_ENV).filter(|v| !v.trim().is_empty()) {
            let id = ProviderId::try_from(provider.trim())
                .with_context(|| format!("Invalid {PROVIDER_ENV}"))?;
            self.set_default_provider(id);
        }

        for id in ProviderId::all() {
            if let Some(key) = lookup(id.api_key_env()).filter(|v| !v.trim().is_empty()) {
                let base_url = self.provider_config(*id).and_then(|c| c.base_url.clone());
                self.providers.insert(
                    id.as_str().to_string(),
                    ProviderConfig { api_key: key.trim().to_string(), base_url },
                );
            }
        }

        Ok(())
    }

    /// Convenience helper: set/replace a provider API key and optionally set default provider.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        let base_url = self.provider_config(provider_id).and_then(|c| c.base_url.clone());
        self.providers
            .insert(provider_id.as_str().to_string(), ProviderConfig { api_key, base_url });

        if self.default_provider.is_none() {
            self.default_provider = Some(provider_id.to_string());
        }
    }

    /// Returns API key for a provider, if present and non-empty.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.provider_config(provider_id)
            .map(|cfg| cfg.api_key.as_str())
            .filter(|key| !key.is_empty())
    }

    pub fn provider_base_url(&self, provider_id: ProviderId) -> Option<&str> {
        self.provider_config(provider_id).and_then(|cfg| cfg.base_url.as_deref())
    }

    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        self.provider_api_key(provider_id).is_some()
    }
}
