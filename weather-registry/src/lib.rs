//! Core library for the weather registry.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Abstraction over weather providers (current conditions and geocoding)
//! - The location registry and the append-only snapshot store
//! - `WeatherService`, which resolves or discovers locations and renders the latest snapshot
//! - The daily background refresh task
//!
//! It is used by `weather-registry-cli`, but can also be embedded behind an HTTP layer.

pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod registry;
pub mod report;
pub mod scheduler;
pub mod service;
pub mod store;

pub use config::{Config, ProviderConfig};
pub use error::WeatherError;
pub use model::{
    Conditions, GeoCandidate, Identifier, Location, LocationId, Snapshot, WeatherReport,
};
pub use provider::{ProviderId, WeatherProvider};
pub use registry::{DiscoveryQuery, LocationRegistry};
pub use scheduler::{DEFAULT_REFRESH_INTERVAL, spawn_refresh_task};
pub use service::{RefreshReport, WeatherService};
pub use store::SnapshotStore;
