use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Registry-assigned location id. Monotonic, never reused.
pub type LocationId = u64;

/// A known place the service reports weather for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    /// Region or country as reported by the geocoder.
    pub region: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Canonical `"<name>,<region>"` string sent to the provider.
    pub provider_query: String,
}

/// A geocoder hit, also used to describe seed locations in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoCandidate {
    pub name: String,
    pub region: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoCandidate {
    /// The location every fresh registry starts with.
    pub fn default_seed() -> Self {
        Self {
            name: "Tashkent".to_string(),
            region: "Uzbekistan".to_string(),
            latitude: 41.2995,
            longitude: 69.2401,
        }
    }

    pub fn provider_query(&self) -> String {
        format!("{},{}", self.name, self.region)
    }
}

/// Raw measurements returned by a current-conditions call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    pub temperature_c: f64,
    pub wind_kph: f64,
    pub cloud_percent: u8,
}

/// One timestamped observation for a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub location_id: LocationId,
    pub observed_at: DateTime<Utc>,
    pub temperature_c: f64,
    pub wind_kph: f64,
    pub cloud_percent: u8,
}

impl Snapshot {
    pub fn new(location_id: LocationId, conditions: Conditions, observed_at: DateTime<Utc>) -> Self {
        Self {
            location_id,
            observed_at,
            temperature_c: conditions.temperature_c,
            wind_kph: conditions.wind_kph,
            cloud_percent: conditions.cloud_percent,
        }
    }
}

/// User-supplied token naming a location: an id, a name, or a region/country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    Id(LocationId),
    Text(String),
}

impl Identifier {
    /// Parse a raw token; all-digit tokens become ids.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<LocationId>() {
            Ok(id) => Identifier::Id(id),
            Err(_) => Identifier::Text(trimmed.to_string()),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Id(id) => write!(f, "{id}"),
            Identifier::Text(text) => f.write_str(text),
        }
    }
}

impl From<LocationId> for Identifier {
    fn from(id: LocationId) -> Self {
        Identifier::Id(id)
    }
}

impl From<&str> for Identifier {
    fn from(raw: &str) -> Self {
        Identifier::parse(raw)
    }
}

impl From<String> for Identifier {
    fn from(raw: String) -> Self {
        Identifier::parse(&raw)
    }
}

/// Externally visible response entry for one queried identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub name: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    pub temp_c: f64,
    pub temp_color: String,
    pub wind_kph: f64,
    pub wind_color: String,
    pub cloud: u8,
    pub cloud_color: String,
}
