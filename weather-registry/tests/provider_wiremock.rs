//! Integration tests for the provider clients and the service using wiremock.
//!
//! These tests verify request shapes, payload mapping and the collapse of
//! every failure mode into `ProviderUnavailable`.

use std::{sync::Arc, time::Duration};

use weather_registry::{
    Identifier, WeatherError, WeatherProvider, WeatherService,
    provider::{openweather::OpenWeatherProvider, weatherapi::WeatherApiProvider},
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn weatherapi_current(temp_c: f64, wind_kph: f64, cloud: u8) -> serde_json::Value {
    serde_json::json!({
        "location": {
            "name": "Paris",
            "region": "Ile-de-France",
            "country": "France",
            "lat": 48.87,
            "lon": 2.33,
            "localtime_epoch": 1705320000
        },
        "current": {
            "last_updated_epoch": 1705320000,
            "temp_c": temp_c,
            "wind_kph": wind_kph,
            "cloud": cloud,
            "humidity": 70,
            "feelslike_c": 3.0,
            "condition": { "text": "Overcast" }
        }
    })
}

fn weatherapi_search_paris() -> serde_json::Value {
    serde_json::json!([
        {
            "id": 803267,
            "name": "Paris",
            "region": "Ile-de-France",
            "country": "France",
            "lat": 48.87,
            "lon": 2.33,
            "url": "paris-ile-de-france-france"
        },
        {
            "id": 2618724,
            "name": "Paris",
            "region": "Texas",
            "country": "United States of America",
            "lat": 33.66,
            "lon": -95.56,
            "url": "paris-texas-united-states-of-america"
        }
    ])
}

/// Create a test client configured to use the mock server
fn weatherapi_client(mock_server: &MockServer) -> WeatherApiProvider {
    WeatherApiProvider::new(Some("TEST_KEY".to_string()), Duration::from_secs(5))
        .expect("Failed to create client")
        .with_base_url(mock_server.uri())
}

fn openweather_client(mock_server: &MockServer) -> OpenWeatherProvider {
    OpenWeatherProvider::new(Some("TEST_KEY".to_string()), Duration::from_secs(5))
        .expect("Failed to create client")
        .with_base_url(mock_server.uri())
}

// ============================================================================
// WeatherAPI.com
// ============================================================================

#[tokio::test]
async fn weatherapi_current_maps_measurements() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/current.json"))
        .and(query_param("key", "TEST_KEY"))
        .and(query_param("q", "Paris,France"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weatherapi_current(5.5, 12.5, 80)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = weatherapi_client(&mock_server);
    let result = client.fetch_current("Paris,France").await;

    assert!(result.is_ok(), "Expected success, got: {result:?}");
    let conditions = result.unwrap();
    assert!((conditions.temperature_c - 5.5).abs() < 0.01);
    assert!((conditions.wind_kph - 12.5).abs() < 0.01);
    assert_eq!(conditions.cloud_percent, 80);
}

#[tokio::test]
async fn weatherapi_search_uses_country_as_region() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("q", "paris"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weatherapi_search_paris()))
        .mount(&mock_server)
        .await;

    let client = weatherapi_client(&mock_server);
    let candidates = client.geocode_search("paris").await.unwrap();

    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].region, "France");
    assert_eq!(candidates[1].region, "United States of America");
}

#[tokio::test]
async fn weatherapi_empty_search_is_not_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&mock_server)
        .await;

    let client = weatherapi_client(&mock_server);
    let candidates = client.geocode_search("atlantis").await.unwrap();

    assert!(candidates.is_empty());
}

#[tokio::test]
async fn weatherapi_error_status_is_provider_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/current.json"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": { "code": 2006, "message": "API key is invalid." }
        })))
        .mount(&mock_server)
        .await;

    let client = weatherapi_client(&mock_server);
    let result = client.fetch_current("Paris,France").await;

    match result {
        Err(WeatherError::ProviderUnavailable(msg)) => {
            assert!(msg.contains("401"), "status missing from: {msg}");
            assert!(msg.contains("API key is invalid"), "body missing from: {msg}");
        }
        other => panic!("Expected ProviderUnavailable, got: {other:?}"),
    }
}

#[tokio::test]
async fn weatherapi_invalid_json_is_provider_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/current.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not valid json"))
        .mount(&mock_server)
        .await;

    let client = weatherapi_client(&mock_server);
    let result = client.fetch_current("Paris,France").await;

    assert!(
        matches!(result, Err(WeatherError::ProviderUnavailable(_))),
        "Expected ProviderUnavailable, got: {result:?}"
    );
}

#[tokio::test]
async fn weatherapi_missing_key_never_hits_the_network() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = WeatherApiProvider::new(None, Duration::from_secs(5))
        .unwrap()
        .with_base_url(mock_server.uri());
    let result = client.geocode_search("paris").await;

    assert!(matches!(result, Err(WeatherError::ProviderUnavailable(_))));
}

// ============================================================================
// OpenWeather
// ============================================================================

#[tokio::test]
async fn openweather_current_converts_wind_to_kph() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "Paris,FR"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "Paris",
            "dt": 1705320000,
            "main": { "temp": 4.0, "feels_like": 1.0, "humidity": 81 },
            "wind": { "speed": 5.0 },
            "clouds": { "all": 100 },
            "weather": [{ "description": "overcast clouds" }]
        })))
        .mount(&mock_server)
        .await;

    let client = openweather_client(&mock_server);
    let conditions = client.fetch_current("Paris,FR").await.unwrap();

    assert!((conditions.temperature_c - 4.0).abs() < 0.01);
    assert!((conditions.wind_kph - 18.0).abs() < 0.01);
    assert_eq!(conditions.cloud_percent, 100);
}

#[tokio::test]
async fn openweather_geocoding_maps_candidates() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .and(query_param("q", "paris"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "name": "Paris", "lat": 48.8589, "lon": 2.32, "country": "FR", "state": "Ile-de-France" }
        ])))
        .mount(&mock_server)
        .await;

    let client = openweather_client(&mock_server);
    let candidates = client.geocode_search("paris").await.unwrap();

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].name, "Paris");
    assert_eq!(candidates[0].region, "FR");
}

#[tokio::test]
async fn openweather_server_error_is_provider_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&mock_server)
        .await;

    let client = openweather_client(&mock_server);
    let result = client.geocode_search("paris").await;

    assert!(matches!(result, Err(WeatherError::ProviderUnavailable(_))));
}

// ============================================================================
// Service over a real HTTP client
// ============================================================================

#[tokio::test]
async fn service_discovers_paris_then_serves_from_cache() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("q", "paris"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weatherapi_search_paris()))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/current.json"))
        .and(query_param("q", "Paris,France"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weatherapi_current(20.0, 35.0, 95)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = WeatherService::new(Arc::new(weatherapi_client(&mock_server)));

    let first = service
        .get_weather(&[Identifier::from("paris,france")])
        .await
        .unwrap();
    let second = service.get_weather(&[Identifier::from("Paris")]).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first[0].name, "Paris");
    assert_eq!(first[0].country, "France");
    assert_eq!(first[0].temp_color, "#FFFACD");
    assert_eq!(first[0].wind_color, "#4DD0E1");
    assert_eq!(first[0].cloud_color, "#616161");
}

#[tokio::test]
async fn service_initialize_skips_failing_location() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/current.json"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let service = WeatherService::new(Arc::new(weatherapi_client(&mock_server)));
    let report = service.initialize().await;

    assert_eq!(report.failed, vec![1]);

    let err = service.get_weather(&[Identifier::from("tashkent")]).await.unwrap_err();
    assert!(matches!(err, WeatherError::SnapshotUnavailable(_)));
    assert_eq!(err.status_code(), 404);
}
