use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

use crate::{
    WeatherError,
    model::{Conditions, GeoCandidate},
    provider::{ProviderId, missing_key, truncate_body},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

const SEARCH_LIMIT: &str = "5";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: Option<String>,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for OpenWeather")?;

        Ok(Self { api_key, base_url: DEFAULT_BASE_URL.to_string(), http })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn fetch_conditions(&self, query: &str) -> Result<Conditions> {
        let url = format!("{}/data/2.5/weather", self.base_url);
        let key = self.api_key.as_deref().ok_or_else(|| missing_key(ProviderId::OpenWeather))?;

        let res = self
            .http
            .get(&url)
            .query(&[("q", query), ("appid", key), ("units", "metric")])
            .send()
            .await
            .context("Failed to send request to OpenWeather (current weather)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read OpenWeather current response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather current request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: OwCurrentResponse =
            serde_json::from_str(&body).context("Failed to parse OpenWeather current JSON")?;

        Ok(Conditions {
            temperature_c: parsed.main.temp,
            // m/s on the wire
            wind_kph: parsed.wind.speed * 3.6,
            cloud_percent: parsed.clouds.all,
        })
    }

    async fn direct_geocode(&self, city: &str) -> Result<Vec<GeoCandidate>> {
        let url = format!("{}/geo/1.0/direct", self.base_url);
        let key = self.api_key.as_deref().ok_or_else(|| missing_key(ProviderId::OpenWeather))?;

        let res = self
            .http
            .get(&url)
            .query(&[("q", city), ("limit", SEARCH_LIMIT), ("appid", key)])
            .send()
            .await
            .context("Failed to send request to OpenWeather (geocoding)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read OpenWeather geocoding response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather geocoding request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let hits: Vec<OwGeoHit> =
            serde_json::from_str(&body).context("Failed to parse OpenWeather geocoding JSON")?;

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
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwClouds {
    all: u8,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
    wind: OwWind,
    clouds: OwClouds,
}

#[derive(Debug, Deserialize)]
struct OwGeoHit {
    name: String,
    country: String,
    lat: f64,
    lon: f64,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self), fields(provider = "openweather"))]
    async fn fetch_current(&self, query: &str) -> Result<Conditions, WeatherError> {
        self.fetch_conditions(query).await.map_err(WeatherError::provider)
    }

    #[instrument(skip(self), fields(provider = "openweather"))]
    async fn geocode_search(&self, city: &str) -> Result<Vec<GeoCandidate>, WeatherError> {
        self.direct_geocode(city).await.map_err(WeatherError::provider)
    }
}
