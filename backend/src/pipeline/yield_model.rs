//! Crop yield projection
//!
//! A deterministic formula over NDVI, latitude band and crop baseline, with
//! a small seeded jitter. Potential yield is what the same field could reach
//! under optimal management, so it is always at least the current figure.

use rand::{rngs::StdRng, Rng, SeedableRng};
use shared::CropType;

use crate::pipeline::synthetic::latitude_band_factor;

/// Projected yield figures in tonnes per hectare
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YieldFigures {
    pub current_yield: f64,
    pub potential_yield: f64,
    pub yield_gap: f64,
}

/// Reference yield for a crop under good conditions, t/ha
pub fn base_yield_t_ha(crop: &CropType) -> f64 {
    match crop {
        CropType::Wheat => 3.5,
        CropType::Corn => 5.5,
        CropType::Soybean => 2.8,
        CropType::Rice => 4.2,
        CropType::Barley => 3.0,
        CropType::Custom(_) => 3.5,
    }
}

/// Project current and potential yield for a field
pub fn project_yield(crop: &CropType, ndvi: f64, latitude: f64, seed: u64) -> YieldFigures {
    let base = base_yield_t_ha(crop);
    let band_adjust = 0.7 + 0.45 * latitude_band_factor(latitude);

    let mut rng = StdRng::seed_from_u64(seed);
    let jitter: f64 = rng.gen_range(0.95..=1.05);

    let current_yield = base * band_adjust * (0.45 + 0.6 * ndvi) * jitter;
    let potential_yield = (base * band_adjust * 1.05).max(current_yield);

    YieldFigures {
        current_yield,
        potential_yield,
        yield_gap: potential_yield - current_yield,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_potential_never_below_current() {
        for ndvi in [0.1, 0.3, 0.5, 0.7, 0.9] {
            for lat in [-60.0, -20.0, 0.0, 20.0, 60.0] {
                for seed in 0..20u64 {
                    let figures = project_yield(&CropType::Corn, ndvi, lat, seed);
                    assert!(figures.potential_yield >= figures.current_yield);
                    assert!(
                        (figures.yield_gap
                            - (figures.potential_yield - figures.current_yield))
                            .abs()
                            < 1e-12
                    );
                }
            }
        }
    }

    #[test]
    fn test_healthy_fields_have_smaller_gap() {
        let poor = project_yield(&CropType::Corn, 0.2, 45.0, 7);
        let healthy = project_yield(&CropType::Corn, 0.85, 45.0, 7);
        assert!(poor.yield_gap > healthy.yield_gap);
    }

    #[test]
    fn test_yields_positive() {
        for crop in [
            CropType::Wheat,
            CropType::Corn,
            CropType::Soybean,
            CropType::Rice,
            CropType::Barley,
            CropType::Custom("quinoa".to_string()),
        ] {
            let figures = project_yield(&crop, 0.5, 10.0, 3);
            assert!(figures.current_yield > 0.0);
            assert!(figures.potential_yield > 0.0);
        }
    }
}
