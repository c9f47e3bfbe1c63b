//! Field entity models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{WeatherSnapshot, YieldEstimate};
use crate::types::{BoundingBox, GeoPoint};

/// A field drawn on the dashboard map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub id: Uuid,
    pub name: String,
    /// Closed boundary ring, first vertex equals last
    pub polygon: Vec<GeoPoint>,
    /// Area in m², derived from the polygon
    pub area_m2: f64,
    pub area_hectares: f64,
    pub center: GeoPoint,
    pub bounding_box: BoundingBox,
    pub ndvi: Option<f64>,
    pub ndvi_min: Option<f64>,
    pub ndvi_max: Option<f64>,
    /// Soil moisture as a percentage (0-100)
    pub soil_moisture: Option<f64>,
    /// Tag identifying which data source produced the current metrics
    pub metrics_source: Option<String>,
    pub ndvi_history: Vec<MetricPoint>,
    pub soil_moisture_history: Vec<MetricPoint>,
    pub weather: Option<WeatherSnapshot>,
    pub yield_estimate: Option<YieldEstimate>,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

/// One point of a daily metric time series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Which metric a history series belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Ndvi,
    SoilMoisture,
}

impl MetricKind {
    /// Valid range for generated history values
    pub fn history_range(&self) -> (f64, f64) {
        match self {
            MetricKind::Ndvi => (0.1, 0.95),
            MetricKind::SoilMoisture => (5.0, 45.0),
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricKind::Ndvi => write!(f, "ndvi"),
            MetricKind::SoilMoisture => write!(f, "soil_moisture"),
        }
    }
}
