//! Threshold-based agronomic recommendations
//!
//! Categories are independent and evaluated in a fixed order: vegetation,
//! then moisture, then yield gap. The returned list is never empty. Lives in
//! the shared crate so the browser can evaluate recommendations offline.

use serde::{Deserialize, Serialize};

/// Inputs the recommendation rules evaluate
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AgronomicIndicators {
    pub ndvi: f64,
    pub soil_moisture: f64,
    pub yield_gap: f64,
}

/// NDVI below this is treated as stressed vegetation
pub const NDVI_STRESSED: f64 = 0.4;

/// NDVI below this (and above stressed) is moderate vigor
pub const NDVI_MODERATE: f64 = 0.6;

/// Soil moisture below this needs more irrigation
pub const MOISTURE_DRY: f64 = 25.0;

/// Soil moisture above this risks waterlogging
pub const MOISTURE_WATERLOGGED: f64 = 60.0;

/// Yield gap above this warrants an input-management review
pub const YIELD_GAP_ACTIONABLE: f64 = 2.0;

/// Produce an ordered, non-empty recommendation list
pub fn recommend(indicators: &AgronomicIndicators) -> Vec<String> {
    let mut recommendations = Vec::new();

    // Vegetation
    if indicators.ndvi < NDVI_STRESSED {
        recommendations.push(
            "Apply nitrogen-rich fertilizer to restore vegetation vigor".to_string(),
        );
        recommendations.push(
            "Check for micronutrient deficiencies (zinc, boron) and supplement as needed"
                .to_string(),
        );
    } else if indicators.ndvi < NDVI_MODERATE {
        recommendations
            .push("Apply variable-rate fertilizer targeting weaker zones".to_string());
    }

    // Moisture
    if indicators.soil_moisture < MOISTURE_DRY {
        recommendations.push(
            "Increase irrigation frequency; soil moisture is below the stress threshold"
                .to_string(),
        );
    } else if indicators.soil_moisture > MOISTURE_WATERLOGGED {
        recommendations
            .push("Improve field drainage to prevent waterlogging and root disease".to_string());
    }

    // Yield gap
    if indicators.yield_gap > YIELD_GAP_ACTIONABLE {
        recommendations.push(
            "Conduct detailed soil testing to identify yield-limiting factors".to_string(),
        );
        recommendations.push(
            "Adopt precision agriculture practices for variable-rate input management"
                .to_string(),
        );
    }

    if recommendations.is_empty() {
        recommendations
            .push("Maintain current practices; all indicators are in the optimal range".to_string());
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_healthy_field_gets_single_maintain_message() {
        let recs = recommend(&AgronomicIndicators {
            ndvi: 0.75,
            soil_moisture: 45.0,
            yield_gap: 0.5,
        });
        assert_eq!(recs.len(), 1);
        assert!(recs[0].contains("Maintain current practices"));
    }

    #[test]
    fn test_stressed_field_triggers_every_category() {
        let recs = recommend(&AgronomicIndicators {
            ndvi: 0.3,
            soil_moisture: 70.0,
            yield_gap: 3.0,
        });
        assert!(recs.iter().any(|r| r.contains("fertilizer")));
        assert!(recs.iter().any(|r| r.contains("drainage")));
        assert!(recs.iter().any(|r| r.contains("soil testing")));
    }

    #[test]
    fn test_moderate_ndvi_gets_variable_rate_item() {
        let recs = recommend(&AgronomicIndicators {
            ndvi: 0.5,
            soil_moisture: 40.0,
            yield_gap: 1.0,
        });
        assert_eq!(recs.len(), 1);
        assert!(recs[0].contains("variable-rate"));
    }

    #[test]
    fn test_never_empty() {
        for ndvi in [0.0, 0.3, 0.5, 0.7, 0.9] {
            for moisture in [10.0, 30.0, 50.0, 70.0] {
                for gap in [0.0, 1.0, 3.0] {
                    let recs = recommend(&AgronomicIndicators {
                        ndvi,
                        soil_moisture: moisture,
                        yield_gap: gap,
                    });
                    assert!(!recs.is_empty());
                }
            }
        }
    }
}
