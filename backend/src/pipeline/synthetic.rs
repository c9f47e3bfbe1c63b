//! Synthetic estimation model
//!
//! The last tier of the fallback chain: a seeded formula over latitude band,
//! growing season and a bounded jitter. Seeds derive from the ring and the
//! current date, so re-estimating the same field on the same day is stable
//! while different fields and days diverge.

use chrono::{Datelike, NaiveDate, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use shared::{ring_center, GeoPoint};

use crate::external::metrics_api::TierError;
use crate::pipeline::estimator::{MetricSource, TierReading};

/// Relative vegetation potential of a latitude band
///
/// Five fixed bands: tropical, subtropical, temperate, subarctic, polar.
pub fn latitude_band_factor(latitude: f64) -> f64 {
    match latitude.abs() {
        l if l < 23.5 => 0.85,
        l if l < 35.0 => 0.75,
        l if l < 55.0 => 0.65,
        l if l < 66.5 => 0.45,
        _ => 0.25,
    }
}

/// Whether the month falls in the hemisphere's growing season
pub fn is_growing_season(latitude: f64, month: u32) -> bool {
    if latitude >= 0.0 {
        (4..=9).contains(&month)
    } else {
        !(4..=9).contains(&month)
    }
}

/// Seasonal multiplier: growing vs dormant
pub fn seasonal_factor(latitude: f64, month: u32) -> f64 {
    if is_growing_season(latitude, month) {
        1.0
    } else {
        0.6
    }
}

/// Deterministic seed from a ring, a date and a purpose tag (FNV-1a)
pub fn ring_seed(ring: &[GeoPoint], date: NaiveDate, tag: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for point in ring {
        hash = fnv_mix(hash, &point.longitude.to_bits().to_le_bytes());
        hash = fnv_mix(hash, &point.latitude.to_bits().to_le_bytes());
    }
    hash = fnv_mix(hash, &date.year().to_le_bytes());
    hash = fnv_mix(hash, &date.ordinal().to_le_bytes());
    fnv_mix(hash, tag.as_bytes())
}

fn fnv_mix(mut hash: u64, bytes: &[u8]) -> u64 {
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

/// Compute a synthetic reading for a ring on a given date
pub fn synthetic_reading(ring: &[GeoPoint], date: NaiveDate) -> TierReading {
    let center = ring_center(ring).unwrap_or_else(|| GeoPoint::new(0.0, 0.0));
    let band = latitude_band_factor(center.latitude);
    let season = seasonal_factor(center.latitude, date.month());

    let mut rng = StdRng::seed_from_u64(ring_seed(ring, date, "metrics"));
    let ndvi_jitter: f64 = rng.gen_range(0.9..=1.1);
    let moisture_jitter: f64 = rng.gen_range(0.9..=1.1);

    TierReading {
        ndvi: (0.65 * band * season * ndvi_jitter).clamp(0.1, 0.9),
        soil_moisture: ((15.0 + 25.0 * band * season) * moisture_jitter).clamp(10.0, 50.0),
    }
}

/// The infallible final estimation tier
pub struct SyntheticModel;

#[axum::async_trait]
impl MetricSource for SyntheticModel {
    fn name(&self) -> &str {
        "synthetic_model"
    }

    fn accuracy(&self) -> f64 {
        0.55
    }

    async fn estimate(&self, ring: &[GeoPoint]) -> Result<TierReading, TierError> {
        Ok(synthetic_reading(ring, Utc::now().date_naive()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_at(lon: f64, lat: f64) -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(lon, lat),
            GeoPoint::new(lon, lat + 0.01),
            GeoPoint::new(lon + 0.01, lat + 0.01),
            GeoPoint::new(lon + 0.01, lat),
            GeoPoint::new(lon, lat),
        ]
    }

    #[test]
    fn test_band_factors_decrease_toward_poles() {
        let factors = [
            latitude_band_factor(0.0),
            latitude_band_factor(30.0),
            latitude_band_factor(45.0),
            latitude_band_factor(60.0),
            latitude_band_factor(80.0),
        ];
        for pair in factors.windows(2) {
            assert!(pair[0] > pair[1]);
        }
    }

    #[test]
    fn test_band_factors_symmetric_across_equator() {
        assert_eq!(latitude_band_factor(45.0), latitude_band_factor(-45.0));
        assert_eq!(latitude_band_factor(70.0), latitude_band_factor(-70.0));
    }

    #[test]
    fn test_growing_season_flips_with_hemisphere() {
        // July: northern summer, southern winter
        assert!(is_growing_season(45.0, 7));
        assert!(!is_growing_season(-45.0, 7));
        // January: the other way around
        assert!(!is_growing_season(45.0, 1));
        assert!(is_growing_season(-45.0, 1));
    }

    #[test]
    fn test_reading_within_bounds_across_latitudes() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 15).unwrap();
        for lat in [-80.0, -40.0, -10.0, 0.0, 10.0, 40.0, 80.0] {
            let reading = synthetic_reading(&square_at(5.0, lat), date);
            assert!((0.1..=0.9).contains(&reading.ndvi), "ndvi at lat {}", lat);
            assert!(
                (10.0..=50.0).contains(&reading.soil_moisture),
                "moisture at lat {}",
                lat
            );
        }
    }

    #[test]
    fn test_reading_deterministic_for_same_ring_and_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let ring = square_at(10.0, 20.0);
        assert_eq!(synthetic_reading(&ring, date), synthetic_reading(&ring, date));
    }

    #[test]
    fn test_seed_varies_by_ring_date_and_tag() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let other_date = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let a = square_at(10.0, 20.0);
        let b = square_at(11.0, 20.0);

        assert_ne!(ring_seed(&a, date, "metrics"), ring_seed(&b, date, "metrics"));
        assert_ne!(
            ring_seed(&a, date, "metrics"),
            ring_seed(&a, other_date, "metrics")
        );
        assert_ne!(
            ring_seed(&a, date, "metrics"),
            ring_seed(&a, date, "ndvi_history")
        );
    }

    #[test]
    fn test_tropical_growing_exceeds_polar_dormant() {
        let july = NaiveDate::from_ymd_opt(2024, 7, 15).unwrap();
        let january = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let tropical = synthetic_reading(&square_at(0.0, 5.0), july);
        let polar = synthetic_reading(&square_at(0.0, 75.0), january);
        assert!(tropical.ndvi > polar.ndvi);
    }
}
