use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::{
    WeatherError,
    model::{Conditions, GeoCandidate},
    provider::{ProviderId, missing_key, truncate_body},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";

/// Client for WeatherAPI.com current conditions and location search.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: Option<String>,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for WeatherAPI.com")?;

        Ok(Self { api_key, base_url: DEFAULT_BASE_URL.to_string(), http })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| missing_key(ProviderId::WeatherApi))
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, endpoint: &str, q: &str) -> Result<T> {
        let url = format!("{}/{endpoint}", self.base_url);
        let key = self.api_key()?;

        let res = self
            .http
            .get(&url)
            .query(&[("key", key), ("q", q)])
            .send()
            .await
            .with_context(|| format!("Failed to send request to WeatherAPI.com ({endpoint})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read WeatherAPI {endpoint} response body"))?;

        if !status.is_success() {
            return Err(anyhow::anyhow!(
                "WeatherAPI {endpoint} request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse WeatherAPI {endpoint} JSON"))
    }

    async fn current(&self, query: &str) -> Result<Conditions> {
        let parsed: WaResponse = self.get_json("current.json", query).await?;

        Ok(Conditions {
            temperature_c: parsed.current.temp_c,
            wind_kph: parsed.current.wind_kph,
            cloud_percent: parsed.current.cloud,
        })
    }

    async fn search(&self, city: &str) -> Result<Vec<GeoCandidate>> {
        let hits: Vec<WaSearchHit> = self.get_json("search.json", city).await?;
        debug!(count = hits.len(), "WeatherAPI search returned candidates");

        Ok(hits
            .into_iter()
            .map(|hit| GeoCandidate {
                name: hit.name,
                region: hit.country,
                latitude: hit.lat,
                longitude: hit.lon,
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    wind_kph: f64,
    cloud: u8,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    current: WaCurrent,
}

#[derive(Debug, Deserialize)]
struct WaSearchHit {
    name: String,
    country: String,
    lat: f64,
    lon: f64,
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    #[instrument(skip(self), fields(provider = "weatherapi"))]
    async fn fetch_current(&self, query: &str) -> Result<Conditions, WeatherError> {
        self.current(query).await.map_err(WeatherError::provider)
    }

    #[instrument(skip(self), fields(provider = "weatherapi"))]
    async fn geocode_search(&self, city: &str) -> Result<Vec<GeoCandidate>, WeatherError> {
        self.search(city).await.map_err(WeatherError::provider)
    }
}
