//! Rendering of a location and its latest snapshot into the response shape,
//! including the color bands for temperature, wind and cloud cover.

use crate::model::{Location, Snapshot, WeatherReport};

/// Inclusive upper bound in °C and the color for values up to it.
const TEMPERATURE_BANDS: &[(f64, &str)] = &[
    (-30.0, "#003366"),
    (-20.0, "#4A90E2"),
    (-10.0, "#B3DFFD"),
    (0.0, "#E6F7FF"),
    (10.0, "#D1F2D3"),
    (20.0, "#FFFACD"),
    (30.0, "#FFCC80"),
    (40.0, "#FF7043"),
];
const TEMPERATURE_ABOVE: &str = "#D32F2F";

/// km/h
const WIND_BANDS: &[(f64, &str)] = &[
    (10.0, "#E0F7FA"),
    (20.0, "#B2EBF2"),
    (40.0, "#4DD0E1"),
    (60.0, "#0288D1"),
];
const WIND_ABOVE: &str = "#01579B";

/// percent
const CLOUD_BANDS: &[(f64, &str)] = &[
    (10.0, "#FFF9C4"),
    (30.0, "#FFF176"),
    (60.0, "#E0E0E0"),
    (90.0, "#9E9E9E"),
];
const CLOUD_ABOVE: &str = "#616161";

fn band(value: f64, bands: &[(f64, &'static str)], above: &'static str) -> &'static str {
    bands.iter().find(|(upper, _)| value <= *upper).map_or(above, |&(_, color)| color)
}

pub fn temperature_color(temperature_c: f64) -> &'static str {
    band(temperature_c, TEMPERATURE_BANDS, TEMPERATURE_ABOVE)
}

pub fn wind_color(wind_kph: f64) -> &'static str {
    band(wind_kph, WIND_BANDS, WIND_ABOVE)
}

pub fn cloud_color(cloud_percent: u8) -> &'static str {
    band(f64::from(cloud_percent), CLOUD_BANDS, CLOUD_ABOVE)
}

impl WeatherReport {
    pub fn render(location: &Location, snapshot: &Snapshot) -> Self {
        Self {
            name: location.name.clone(),
            country: location.region.clone(),
            lat: location.latitude,
            lon: location.longitude,
            temp_c: snapshot.temperature_c,
            temp_color: temperature_color(snapshot.temperature_c).to_string(),
            wind_kph: snapshot.wind_kph,
            wind_color: wind_color(snapshot.wind_kph).to_string(),
            cloud: snapshot.cloud_percent,
            cloud_color: cloud_color(snapshot.cloud_percent).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Conditions, GeoCandidate};
    use chrono::Utc;

    #[test]
    fn temperature_upper_edges_are_inclusive() {
        assert_eq!(temperature_color(20.0), "#FFFACD");
        assert_eq!(temperature_color(20.1), "#FFCC80");
        assert_eq!(temperature_color(-30.0), "#003366");
        assert_eq!(temperature_color(-45.0), "#003366");
        assert_eq!(temperature_color(-29.9), "#4A90E2");
        assert_eq!(temperature_color(0.0), "#E6F7FF");
        assert_eq!(temperature_color(40.0), "#FF7043");
        assert_eq!(temperature_color(40.5), "#D32F2F");
    }

    #[test]
    fn wind_bands() {
        assert_eq!(wind_color(0.0), "#E0F7FA");
        assert_eq!(wind_color(10.0), "#E0F7FA");
        assert_eq!(wind_color(10.1), "#B2EBF2");
        assert_eq!(wind_color(40.0), "#4DD0E1");
        assert_eq!(wind_color(60.0), "#0288D1");
        assert_eq!(wind_color(120.0), "#01579B");
    }

    #[test]
    fn cloud_bands() {
        assert_eq!(cloud_color(0), "#FFF9C4");
        assert_eq!(cloud_color(11), "#FFF176");
        assert_eq!(cloud_color(60), "#E0E0E0");
        assert_eq!(cloud_color(90), "#9E9E9E");
        assert_eq!(cloud_color(91), "#616161");
        assert_eq!(cloud_color(100), "#616161");
    }

    #[test]
    fn nan_falls_through_to_top_band() {
        assert_eq!(temperature_color(f64::NAN), "#D32F2F");
    }

    #[test]
    fn render_copies_location_and_measurements() {
        let location = Location {
            id: 1,
            name: "Tashkent".into(),
            region: "Uzbekistan".into(),
            latitude: 41.2995,
            longitude: 69.2401,
            provider_query: GeoCandidate::default_seed().provider_query(),
        };
        let snapshot = Snapshot::new(
            1,
            Conditions { temperature_c: 25.0, wind_kph: 15.0, cloud_percent: 50 },
            Utc::now(),
        );

        let report = WeatherReport::render(&location, &snapshot);
        assert_eq!(report.name, "Tashkent");
        assert_eq!(report.country, "Uzbekistan");
        assert_eq!(report.lat, 41.2995);
        assert_eq!(report.temp_color, "#FFCC80");
        assert_eq!(report.wind_color, "#B2EBF2");
        assert_eq!(report.cloud, 50);
        assert_eq!(report.cloud_color, "#E0E0E0");
    }
}
