//! Common geographic types used across the platform

use serde::{Deserialize, Serialize};

/// A single [longitude, latitude] vertex
///
/// Serialized as a two-element array to match the GeoJSON-like wire format
/// the map surface produces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

impl From<[f64; 2]> for GeoPoint {
    fn from(pair: [f64; 2]) -> Self {
        Self {
            longitude: pair[0],
            latitude: pair[1],
        }
    }
}

impl From<GeoPoint> for [f64; 2] {
    fn from(point: GeoPoint) -> Self {
        [point.longitude, point.latitude]
    }
}

/// Axis-aligned bounding box, serialized as [min_lon, min_lat, max_lon, max_lat]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl From<[f64; 4]> for BoundingBox {
    fn from(b: [f64; 4]) -> Self {
        Self {
            min_lon: b[0],
            min_lat: b[1],
            max_lon: b[2],
            max_lat: b[3],
        }
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.min_lon, b.min_lat, b.max_lon, b.max_lat]
    }
}
