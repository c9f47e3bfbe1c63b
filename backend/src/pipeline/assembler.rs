//! Field record assembly
//!
//! Pure merge of extractor, estimator and generator outputs into the Field
//! entity. No network or storage access happens here.

use chrono::{DateTime, Utc};
use shared::{Field, FieldGeometry, GeoPoint, MetricPoint, WeatherSnapshot, YieldEstimate};
use uuid::Uuid;

use crate::pipeline::estimator::FieldMetricsEstimate;

/// Half-width of the min/max window reported around the NDVI mean
const NDVI_WINDOW: f64 = 0.08;

/// Everything the assembler merges into a Field
pub struct FieldParts {
    pub id: Uuid,
    pub name: String,
    /// Closed boundary ring
    pub polygon: Vec<GeoPoint>,
    pub geometry: FieldGeometry,
    pub metrics: Option<FieldMetricsEstimate>,
    pub ndvi_history: Vec<MetricPoint>,
    pub soil_moisture_history: Vec<MetricPoint>,
    pub weather: Option<WeatherSnapshot>,
    pub yield_estimate: Option<YieldEstimate>,
    pub created_at: DateTime<Utc>,
}

/// Min/max window around an NDVI mean, clamped to the physical range
/// and preserving min <= mean <= max
pub fn ndvi_window(mean: f64) -> (f64, f64) {
    (
        (mean - NDVI_WINDOW).clamp(0.0, mean),
        (mean + NDVI_WINDOW).clamp(mean, 1.0),
    )
}

/// Merge pipeline outputs into a Field, stamping `last_updated`
pub fn assemble_field(parts: FieldParts) -> Field {
    let (ndvi, ndvi_min, ndvi_max, soil_moisture, metrics_source) = match &parts.metrics {
        Some(metrics) => {
            let (min, max) = ndvi_window(metrics.ndvi);
            (
                Some(metrics.ndvi),
                Some(min),
                Some(max),
                Some(metrics.soil_moisture),
                Some(metrics.source.clone()),
            )
        }
        None => (None, None, None, None, None),
    };

    Field {
        id: parts.id,
        name: parts.name,
        polygon: parts.polygon,
        area_m2: parts.geometry.area_m2,
        area_hectares: parts.geometry.area_hectares,
        center: parts.geometry.center,
        bounding_box: parts.geometry.bounding_box,
        ndvi,
        ndvi_min,
        ndvi_max,
        soil_moisture,
        metrics_source,
        ndvi_history: parts.ndvi_history,
        soil_moisture_history: parts.soil_moisture_history,
        weather: parts.weather,
        yield_estimate: parts.yield_estimate,
        created_at: parts.created_at,
        last_updated: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ndvi_window_ordering() {
        for mean in [0.0, 0.05, 0.5, 0.88, 1.0] {
            let (min, max) = ndvi_window(mean);
            assert!(min <= mean);
            assert!(mean <= max);
            assert!(min >= 0.0);
            assert!(max <= 1.0);
        }
    }
}
