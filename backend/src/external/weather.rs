//! Weather API client for fetching current conditions
//!
//! Integrates with OpenWeatherMap, trimmed to the fields the dashboard
//! panel actually shows.

use chrono::Utc;
use reqwest::Client;
use rust_decimal::Decimal;
use shared::{GeoPoint, WeatherSnapshot};

use crate::error::{AppError, AppResult};

/// Weather API client
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
}

/// OpenWeatherMap API response for current weather
#[derive(Debug, serde::Deserialize)]
struct OWMCurrentResponse {
    coord: OWMCoord,
    weather: Vec<OWMWeather>,
    main: OWMMain,
    wind: OWMWind,
}

#[derive(Debug, serde::Deserialize)]
struct OWMCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, serde::Deserialize)]
struct OWMWeather {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, serde::Deserialize)]
struct OWMMain {
    temp: f64,
    humidity: i32,
}

#[derive(Debug, serde::Deserialize)]
struct OWMWind {
    speed: f64,
}

impl WeatherClient {
    /// Create a new WeatherClient
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
        }
    }

    /// Fetch current weather conditions by coordinates
    pub async fn get_current_weather(&self, location: GeoPoint) -> AppResult<WeatherSnapshot> {
        let url = format!(
            "{}/weather?lat={}&lon={}&appid={}&units=metric",
            self.base_url, location.latitude, location.longitude, self.api_key
        );

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::warn!("Weather API request failed: {}", e);
            AppError::WeatherServiceUnavailable
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Weather API error: {} - {}", status, body);
            return Err(AppError::WeatherServiceUnavailable);
        }

        let data: OWMCurrentResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to parse weather response: {}", e)))?;

        Ok(convert_current_response(data))
    }
}

/// Convert OpenWeatherMap current response to our snapshot format
fn convert_current_response(data: OWMCurrentResponse) -> WeatherSnapshot {
    let weather = data.weather.first();

    WeatherSnapshot {
        location: GeoPoint::new(data.coord.lon, data.coord.lat),
        temperature_celsius: Decimal::from_f64_retain(data.main.temp).unwrap_or_default(),
        humidity_percent: data.main.humidity,
        wind_speed_mps: Decimal::from_f64_retain(data.wind.speed).unwrap_or_default(),
        condition: weather.map(|w| w.main.clone()).unwrap_or_default(),
        description: weather.map(|w| w.description.clone()).unwrap_or_default(),
        icon: weather.map(|w| w.icon.clone()).unwrap_or_default(),
        fetched_at: Utc::now(),
    }
}
