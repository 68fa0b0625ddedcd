//! Known locations and identifier resolution.
//!
//! The registry only ever grows. Lookups are linear scans; the collection is
//! small and the first match wins.

use parking_lot::RwLock;

use crate::model::{GeoCandidate, Identifier, Location, LocationId};

#[derive(Debug)]
struct Inner {
    locations: Vec<Location>,
    next_id: LocationId,
}

#[derive(Debug)]
pub struct LocationRegistry {
    inner: RwLock<Inner>,
}

impl Default for LocationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationRegistry {
    /// Empty registry; the first registered location gets id 1.
    pub fn new() -> Self {
        Self { inner: RwLock::new(Inner { locations: Vec::new(), next_id: 1 }) }
    }

    pub fn with_seeds(seeds: &[GeoCandidate]) -> Self {
        let registry = Self::new();
        for seed in seeds {
            registry.register(seed);
        }
        registry
    }

    /// Allocate a fresh id and append a location built from `candidate`.
    pub fn register(&self, candidate: &GeoCandidate) -> Location {
        let mut inner = self.inner.write();
        let id = inner.next_id;
        inner.next_id += 1;

        let location = Location {
            id,
            name: candidate.name.clone(),
            region: candidate.region.clone(),
            latitude: candidate.latitude,
            longitude: candidate.longitude,
            provider_query: candidate.provider_query(),
        };
        inner.locations.push(location.clone());
        location
    }

    /// First location whose id, name or region matches, tried in that order.
    ///
    /// Name and region comparisons are case-insensitive exact matches. A
    /// textual identifier made only of digits also matches by id.
    pub fn resolve(&self, identifier: &Identifier) -> Option<Location> {
        let (id, text) = match identifier {
            Identifier::Id(id) => (Some(*id), id.to_string()),
            Identifier::Text(text) => (text.trim().parse::<LocationId>().ok(), text.trim().to_string()),
        };
        let text = text.to_lowercase();

        let inner = self.inner.read();
        inner
            .locations
            .iter()
            .find(|l| {
                id == Some(l.id) || l.name.to_lowercase() == text || l.region.to_lowercase() == text
            })
            .cloned()
    }

    pub fn get(&self, id: LocationId) -> Option<Location> {
        self.inner.read().locations.iter().find(|l| l.id == id).cloned()
    }

    /// Copy of every location at this instant, in registration order.
    pub fn all(&self) -> Vec<Location> {
        self.inner.read().locations.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parsed discovery text: `"city"` or `"city,region"`, lower-cased and trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryQuery {
    pub city: String,
    pub region: Option<String>,
}

impl DiscoveryQuery {
    /// Split on the first comma. Returns `None` when no city is left.
    pub fn parse(text: &str) -> Option<Self> {
        let lower = text.to_lowercase();
        let (city, region) = match lower.split_once(',') {
            Some((city, region)) => (city.trim(), Some(region.trim())),
            None => (lower.trim(), None),
        };

        if city.is_empty() {
            return None;
        }

        Some(Self {
            city: city.to_string(),
            region: region.filter(|r| !r.is_empty()).map(str::to_string),
        })
    }

    /// Pick a geocoder candidate.
    ///
    /// With a region, the first candidate whose name contains the city and
    /// whose region contains the region wins. Otherwise, or when no compound
    /// match exists, the first candidate whose name equals the city wins.
    pub fn select<'a>(&self, candidates: &'a [GeoCandidate]) -> Option<&'a GeoCandidate> {
        let compound = self.region.as_deref().and_then(|region| {
            candidates.iter().find(|c| {
                c.name.to_lowercase().contains(&self.city)
                    && c.region.to_lowercase().contains(region)
            })
        });

        compound.or_else(|| candidates.iter().find(|c| c.name.to_lowercase() == self.city))
    }
}
