use thiserror::Error;

/// Failures surfaced to callers of the weather service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    /// The identifier matched no known location and discovery found nothing.
    #[error("Location not found: {0}")]
    LocationNotFound(String),

    /// The location exists but no snapshot has been fetched for it yet.
    #[error("Weather data not found for {0}")]
    SnapshotUnavailable(String),

    /// Transport, status or payload failure talking to the provider.
    #[error("Failed to fetch weather data: {0}")]
    ProviderUnavailable(String),
}

impl WeatherError {
    /// Collapse a provider-side error chain into `ProviderUnavailable`.
    pub fn provider(err: anyhow::Error) -> Self {
        WeatherError::ProviderUnavailable(format!("{err:#}"))
    }

    /// HTTP status an outer web layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            WeatherError::LocationNotFound(_) | WeatherError::SnapshotUnavailable(_) => 404,
            WeatherError::ProviderUnavailable(_) => 500,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == 404
    }
}
