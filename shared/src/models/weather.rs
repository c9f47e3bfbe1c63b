//! Weather data models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::GeoPoint;

/// A weather snapshot for a field, refreshed on demand
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: GeoPoint,
    pub temperature_celsius: Decimal,
    pub humidity_percent: i32,
    pub wind_speed_mps: Decimal,
    pub condition: String,
    pub description: String,
    pub icon: String,
    pub fetched_at: DateTime<Utc>,
}
