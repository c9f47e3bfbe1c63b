//! Validation utilities for the CropSight field dashboard

use crate::geometry::distinct_vertex_count;
use crate::types::GeoPoint;

// ============================================================================
// Geometry Validations
// ============================================================================

/// Validate a drawn boundary ring
///
/// A usable ring has at least 3 distinct vertices and every vertex within
/// the valid longitude/latitude range. Closure is not required here; the
/// geometry extractor closes open rings itself.
pub fn validate_ring(ring: &[GeoPoint]) -> Result<(), &'static str> {
    if distinct_vertex_count(ring) < 3 {
        return Err("Ring must have at least 3 distinct vertices");
    }
    for point in ring {
        validate_coordinates(point)?;
    }
    Ok(())
}

/// Validate a single coordinate pair
pub fn validate_coordinates(point: &GeoPoint) -> Result<(), &'static str> {
    if !point.longitude.is_finite() || point.longitude < -180.0 || point.longitude > 180.0 {
        return Err("Longitude must be between -180 and 180");
    }
    if !point.latitude.is_finite() || point.latitude < -90.0 || point.latitude > 90.0 {
        return Err("Latitude must be between -90 and 90");
    }
    Ok(())
}

/// A ring the estimator should skip entirely rather than reject
pub fn is_degenerate_ring(ring: &[GeoPoint]) -> bool {
    distinct_vertex_count(ring) < 3
}

// ============================================================================
// Metric Validations
// ============================================================================

/// Validate NDVI is in the physical [-1, 1] range
pub fn validate_ndvi(ndvi: f64) -> Result<(), &'static str> {
    if !ndvi.is_finite() || !(-1.0..=1.0).contains(&ndvi) {
        return Err("NDVI must be between -1 and 1");
    }
    Ok(())
}

/// Validate soil moisture percentage
pub fn validate_soil_moisture(moisture: f64) -> Result<(), &'static str> {
    if !moisture.is_finite() || !(0.0..=100.0).contains(&moisture) {
        return Err("Soil moisture must be between 0 and 100%");
    }
    Ok(())
}

/// Validate an estimate confidence value
pub fn validate_accuracy(accuracy: f64) -> Result<(), &'static str> {
    if !accuracy.is_finite() || !(0.0..=1.0).contains(&accuracy) {
        return Err("Accuracy must be between 0 and 1");
    }
    Ok(())
}

/// Validate a field display name
pub fn validate_field_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Field name cannot be empty");
    }
    if name.len() > 120 {
        return Err("Field name must be at most 120 characters");
    }
    Ok(())
}
