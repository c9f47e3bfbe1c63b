//! WebAssembly module for the CropSight field dashboard
//!
//! Provides client-side computation for:
//! - Polygon geometry extraction (area, center, bounding box)
//! - Recommendation evaluation
//! - Yield-gap calculations
//! - Offline boundary validation

use shared::recommend::{recommend, AgronomicIndicators};
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::geometry::*;
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn parse_ring(ring_json: &str) -> Result<Vec<GeoPoint>, JsValue> {
    serde_json::from_str(ring_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid ring JSON: {}", e)))
}

/// Extract area, center and bounding box from a boundary ring
///
/// Input is a JSON array of [lon, lat] pairs; output is the derived geometry
/// as JSON, or "null" for an empty ring.
#[wasm_bindgen]
pub fn extract_field_geometry(ring_json: &str) -> Result<String, JsValue> {
    let ring = parse_ring(ring_json)?;
    let geometry = extract_geometry(&ring);
    serde_json::to_string(&geometry)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Area of a boundary ring in hectares (0 for degenerate rings)
#[wasm_bindgen]
pub fn field_area_hectares(ring_json: &str) -> Result<f64, JsValue> {
    let ring = parse_ring(ring_json)?;
    Ok(ring_area_m2(&ring) / 10_000.0)
}

/// Whether a drawn ring is usable as a field boundary
#[wasm_bindgen]
pub fn is_ring_valid(ring_json: &str) -> bool {
    match serde_json::from_str::<Vec<GeoPoint>>(ring_json) {
        Ok(ring) => validate_ring(&ring).is_ok(),
        Err(_) => false,
    }
}

/// Evaluate agronomic recommendations for the given indicators
///
/// Returns a JSON array of recommendation strings, never empty.
#[wasm_bindgen]
pub fn evaluate_recommendations(
    ndvi: f64,
    soil_moisture: f64,
    yield_gap: f64,
) -> Result<String, JsValue> {
    let recommendations = recommend(&AgronomicIndicators {
        ndvi,
        soil_moisture,
        yield_gap,
    });
    serde_json::to_string(&recommendations)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Yield gap in t/ha; negative inputs are treated as no gap
#[wasm_bindgen]
pub fn calculate_yield_gap(current_yield: f64, potential_yield: f64) -> f64 {
    (potential_yield - current_yield).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = "[[0.0,0.0],[0.0,1.0],[1.0,1.0],[1.0,0.0],[0.0,0.0]]";

    #[test]
    fn test_extract_field_geometry() {
        let json = extract_field_geometry(SQUARE).unwrap();
        assert!(json.contains("area_m2"));
        assert!(json.contains("bounding_box"));
    }

    #[test]
    fn test_extract_field_geometry_empty_ring() {
        assert_eq!(extract_field_geometry("[]").unwrap(), "null");
    }

    #[test]
    fn test_field_area_hectares() {
        let area = field_area_hectares(SQUARE).unwrap();
        assert!(area > 1.0e6); // a 1°x1° equatorial square is over a million hectares
    }

    #[test]
    fn test_is_ring_valid() {
        assert!(is_ring_valid(SQUARE));
        assert!(!is_ring_valid("[[0.0,0.0],[1.0,1.0]]"));
        assert!(!is_ring_valid("not json"));
    }

    #[test]
    fn test_evaluate_recommendations_never_empty() {
        let json = evaluate_recommendations(0.75, 45.0, 0.5).unwrap();
        let recs: Vec<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(recs.len(), 1);
    }

    #[test]
    fn test_calculate_yield_gap() {
        assert!((calculate_yield_gap(3.0, 5.0) - 2.0).abs() < 1e-12);
        assert_eq!(calculate_yield_gap(5.0, 3.0), 0.0);
    }
}
