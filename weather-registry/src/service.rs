//! The weather service: owns the location registry and snapshot store and
//! answers queries against them.
//!
//! Provider calls are always made with no lock held. The registry and store
//! locks are only taken for the short copy-in/copy-out around each call.

use chrono::Utc;
use std::{fmt, sync::Arc};
use tracing::{debug, error, info, instrument, warn};

use crate::{
    WeatherError,
    model::{GeoCandidate, Identifier, Location, LocationId, Snapshot, WeatherReport},
    provider::WeatherProvider,
    registry::{DiscoveryQuery, LocationRegistry},
    store::SnapshotStore,
};

/// Outcome of one refresh pass over every known location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub refreshed: Vec<LocationId>,
    pub failed: Vec<LocationId>,
}

pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
    registry: LocationRegistry,
    snapshots: SnapshotStore,
}

impl fmt::Debug for WeatherService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherService")
            .field("registry", &self.registry)
            .field("snapshots", &self.snapshots)
            .finish_non_exhaustive()
    }
}

impl WeatherService {
    /// Service seeded with the default location.
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self::with_seeds(provider, &[GeoCandidate::default_seed()])
    }

    pub fn with_seeds(provider: Arc<dyn WeatherProvider>, seeds: &[GeoCandidate]) -> Self {
        Self {
            provider,
            registry: LocationRegistry::with_seeds(seeds),
            snapshots: SnapshotStore::new(),
        }
    }

    pub fn registry(&self) -> &LocationRegistry {
        &self.registry
    }

    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    /// Startup hook: runs the first refresh pass so early queries have data.
    pub async fn initialize(&self) -> RefreshReport {
        info!("Fetching initial weather data");
        self.refresh_all().await
    }

    /// Fetch current conditions for one location and append them.
    pub async fn refresh_location(&self, location: &Location) -> Result<Snapshot, WeatherError> {
        let conditions = self.provider.fetch_current(&location.provider_query).await?;
        let snapshot = Snapshot::new(location.id, conditions, Utc::now());
        self.snapshots.append(snapshot.clone());
        Ok(snapshot)
    }

    /// One refresh tick over the locations known when the tick starts.
    ///
    /// A failure for one location is logged and does not stop the others.
    pub async fn refresh_all(&self) -> RefreshReport {
        let locations = self.registry.all();
        info!(count = locations.len(), "Starting weather update");

        let mut report = RefreshReport::default();
        for location in &locations {
            match self.refresh_location(location).await {
                Ok(_) => report.refreshed.push(location.id),
                Err(e) => {
                    warn!(
                        location_id = location.id,
                        query = %location.provider_query,
                        error = %e,
                        "Skipping weather update for location"
                    );
                    report.failed.push(location.id);
                }
            }
        }

        info!(
            refreshed = report.refreshed.len(),
            failed = report.failed.len(),
            "Weather update completed"
        );
        report
    }

    pub fn resolve(&self, identifier: &Identifier) -> Option<Location> {
        self.registry.resolve(identifier)
    }

    /// Geocode unknown text, register the match and fetch its first snapshot.
    ///
    /// If that first fetch fails the location stays registered without a
    /// snapshot and the provider error is returned.
    #[instrument(skip(self))]
    pub async fn discover(&self, text: &str) -> Result<Location, WeatherError> {
        let query = DiscoveryQuery::parse(text)
            .ok_or_else(|| WeatherError::LocationNotFound(text.to_string()))?;

        let candidates = self.provider.geocode_search(&query.city).await.inspect_err(|e| {
            error!(error = %e, "Failed to add location");
        })?;

        if candidates.is_empty() {
            debug!(city = %query.city, "Geocoder returned no candidates");
            return Err(WeatherError::LocationNotFound(text.to_string()));
        }

        let Some(candidate) = query.select(&candidates) else {
            debug!(count = candidates.len(), "No candidate matched the query");
            return Err(WeatherError::LocationNotFound(text.to_string()));
        };

        let location = self.registry.register(candidate);
        info!(
            location_id = location.id,
            name = %location.name,
            region = %location.region,
            "Registered new location"
        );

        self.refresh_location(&location).await.inspect_err(|e| {
            error!(location_id = location.id, error = %e, "Initial weather fetch failed");
        })?;

        Ok(location)
    }

    pub async fn resolve_or_discover(
        &self,
        identifier: &Identifier,
    ) -> Result<Location, WeatherError> {
        if let Some(location) = self.resolve(identifier) {
            debug!(%identifier, location_id = location.id, "Resolved known location");
            return Ok(location);
        }

        self.discover(&identifier.to_string()).await
    }

    /// Latest report for each identifier, in input order.
    ///
    /// Fails as a whole on the first identifier that cannot be resolved or
    /// has no snapshot yet.
    pub async fn get_weather(
        &self,
        identifiers: &[Identifier],
    ) -> Result<Vec<WeatherReport>, WeatherError> {
        let mut reports = Vec::with_capacity(identifiers.len());

        for identifier in identifiers {
            let location = self.resolve_or_discover(identifier).await?;
            let snapshot = self
                .snapshots
                .latest(location.id)
                .ok_or_else(|| WeatherError::SnapshotUnavailable(location.name.clone()))?;

            reports.push(WeatherReport::render(&location, &snapshot));
        }

        Ok(reports)
    }
}
