use crate::{
    Config, WeatherError,
    model::{Conditions, GeoCandidate},
    provider::{openweather::OpenWeatherProvider, weatherapi::WeatherApiProvider},
};
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use std::{sync::Arc, time::Duration};

pub mod openweather;
pub mod weatherapi;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenWeather,
    WeatherApi,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::WeatherApi => "weatherapi",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenWeather, ProviderId::WeatherApi]
    }

    /// Environment variable consulted for this provider's API key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "OPENWEATHER_API_KEY",
            ProviderId::WeatherApi => "WEATHERAPI_KEY",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openweather" => Ok(ProviderId::OpenWeather),
            "weatherapi" => Ok(ProviderId::WeatherApi),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: openweather, weatherapi."
            )),
        }
    }
}

/// The two calls the core makes against an external weather provider.
///
/// Implementations never retry; every transport, status or parse failure is
/// reported as [`WeatherError::ProviderUnavailable`].
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Current conditions for a canonical provider query such as `"Paris,France"`.
    async fn fetch_current(&self, query: &str) -> Result<Conditions, WeatherError>;

    /// Free-text city search. An empty result means "no matches", not a failure.
    async fn geocode_search(&self, city: &str) -> Result<Vec<GeoCandidate>, WeatherError>;
}

/// Construct a provider from config and explicit ProviderId.
///
/// A missing API key is not an error here: the provider is still built and
/// reports `ProviderUnavailable` on its first call.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let api_key = config.provider_api_key(id).map(str::to_owned);
    if api_key.is_none() {
        tracing::warn!(provider = %id, "No API key configured; provider calls will fail");
    }

    let timeout = Duration::from_secs(config.timeout_secs);
    let base_url = config.provider_base_url(id).map(str::to_owned);

    let provider: Arc<dyn WeatherProvider> = match id {
        ProviderId::OpenWeather => {
            let mut p = OpenWeatherProvider::new(api_key, timeout)?;
            if let Some(url) = base_url {
                p = p.with_base_url(url);
            }
            Arc::new(p)
        }
        ProviderId::WeatherApi => {
            let mut p = WeatherApiProvider::new(api_key, timeout)?;
            if let Some(url) = base_url {
                p = p.with_base_url(url);
            }
            Arc::new(p)
        }
    };

    Ok(provider)
}

/// Construct the default provider from config, using `default_provider` field.
pub fn default_provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let id = config.default_provider_id()?;
    provider_from_config(id, config)
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

pub(crate) fn missing_key(id: ProviderId) -> anyhow::Error {
    anyhow::anyhow!(
        "No API key configured for provider '{id}'. \
         Set {} or run `weather configure {id}`.",
        id.api_key_env()
    )
}
