//! Metrics estimator integration tests
//!
//! Covers the tiered fallback chain: strict ordering, single invocation per
//! tier, degenerate-ring short circuit, progress side channel, and the
//! output bound guarantees.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cropsight_backend::external::metrics_api::TierError;
use cropsight_backend::pipeline::estimator::{
    EstimationProgress, MetricSource, MetricsEstimator, TierReading, NDVI_RANGE,
    SOIL_MOISTURE_RANGE,
};
use proptest::prelude::*;
use shared::GeoPoint;

fn square_ring() -> Vec<GeoPoint> {
    vec![
        GeoPoint::new(0.0, 0.0),
        GeoPoint::new(0.0, 1.0),
        GeoPoint::new(1.0, 1.0),
        GeoPoint::new(1.0, 0.0),
        GeoPoint::new(0.0, 0.0),
    ]
}

/// Tier that always fails, counting invocations
struct FailingSource {
    name: &'static str,
    calls: Arc<AtomicUsize>,
}

#[axum::async_trait]
impl MetricSource for FailingSource {
    fn name(&self) -> &str {
        self.name
    }

    fn accuracy(&self) -> f64 {
        0.9
    }

    async fn estimate(&self, _ring: &[GeoPoint]) -> Result<TierReading, TierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(TierError::Malformed("no data".to_string()))
    }
}

/// Tier that always succeeds with a fixed reading, counting invocations
struct FixedSource {
    name: &'static str,
    reading: TierReading,
    calls: Arc<AtomicUsize>,
}

#[axum::async_trait]
impl MetricSource for FixedSource {
    fn name(&self) -> &str {
        self.name
    }

    fn accuracy(&self) -> f64 {
        0.8
    }

    async fn estimate(&self, _ring: &[GeoPoint]) -> Result<TierReading, TierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reading)
    }
}

fn counters() -> (Arc<AtomicUsize>, Arc<AtomicUsize>, Arc<AtomicUsize>, Arc<AtomicUsize>) {
    (
        Arc::new(AtomicUsize::new(0)),
        Arc::new(AtomicUsize::new(0)),
        Arc::new(AtomicUsize::new(0)),
        Arc::new(AtomicUsize::new(0)),
    )
}

const GOOD_READING: TierReading = TierReading {
    ndvi: 0.62,
    soil_moisture: 33.0,
};

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[tokio::test]
    async fn test_first_successful_tier_wins() {
        let (c1, c2, _, _) = counters();
        let estimator = MetricsEstimator::new(vec![
            Box::new(FixedSource {
                name: "primary_remote",
                reading: GOOD_READING,
                calls: c1.clone(),
            }),
            Box::new(FixedSource {
                name: "secondary_remote",
                reading: GOOD_READING,
                calls: c2.clone(),
            }),
        ]);

        let estimate = estimator.estimate(&square_ring()).await.unwrap();
        assert_eq!(estimate.source, "primary_remote");
        assert_eq!(c1.load(Ordering::SeqCst), 1);
        assert_eq!(c2.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_tiers_each_tried_exactly_once() {
        let (c1, c2, c3, c4) = counters();
        let estimator = MetricsEstimator::new(vec![
            Box::new(FailingSource {
                name: "primary_remote",
                calls: c1.clone(),
            }),
            Box::new(FailingSource {
                name: "secondary_remote",
                calls: c2.clone(),
            }),
            Box::new(FixedSource {
                name: "tertiary_remote",
                reading: GOOD_READING,
                calls: c3.clone(),
            }),
            Box::new(FixedSource {
                name: "synthetic_model",
                reading: GOOD_READING,
                calls: c4.clone(),
            }),
        ]);

        let estimate = estimator.estimate(&square_ring()).await.unwrap();
        assert_eq!(estimate.source, "tertiary_remote");
        assert_eq!(c1.load(Ordering::SeqCst), 1);
        assert_eq!(c2.load(Ordering::SeqCst), 1);
        assert_eq!(c3.load(Ordering::SeqCst), 1);
        // The final tier is reached only when every earlier tier failed
        assert_eq!(c4.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_degenerate_ring_short_circuits_without_calls() {
        let (c1, c2, _, _) = counters();
        let estimator = MetricsEstimator::new(vec![
            Box::new(FixedSource {
                name: "primary_remote",
                reading: GOOD_READING,
                calls: c1.clone(),
            }),
            Box::new(FixedSource {
                name: "secondary_remote",
                reading: GOOD_READING,
                calls: c2.clone(),
            }),
        ]);

        assert!(estimator.estimate(&[]).await.is_none());
        let two_points = vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0)];
        assert!(estimator.estimate(&two_points).await.is_none());

        assert_eq!(c1.load(Ordering::SeqCst), 0);
        assert_eq!(c2.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_progress_events_follow_tier_order() {
        let (c1, c2, _, _) = counters();
        let estimator = MetricsEstimator::new(vec![
            Box::new(FailingSource {
                name: "primary_remote",
                calls: c1,
            }),
            Box::new(FixedSource {
                name: "secondary_remote",
                reading: GOOD_READING,
                calls: c2,
            }),
        ]);

        let mut progress = estimator.subscribe();
        estimator.estimate(&square_ring()).await.unwrap();

        let mut events = Vec::new();
        while let Ok(event) = progress.try_recv() {
            events.push(event);
        }

        assert_eq!(
            events,
            vec![
                EstimationProgress::Trying {
                    source: "primary_remote".to_string()
                },
                EstimationProgress::TierFailed {
                    source: "primary_remote".to_string()
                },
                EstimationProgress::Trying {
                    source: "secondary_remote".to_string()
                },
                EstimationProgress::Resolved {
                    source: "secondary_remote".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_accuracy_and_source_recorded() {
        let (c1, _, _, _) = counters();
        let estimator = MetricsEstimator::new(vec![Box::new(FixedSource {
            name: "primary_remote",
            reading: GOOD_READING,
            calls: c1,
        })]);

        let estimate = estimator.estimate(&square_ring()).await.unwrap();
        assert_eq!(estimate.accuracy, 0.8);
        assert!((0.0..=1.0).contains(&estimate.accuracy));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Whatever a tier reports, the estimate stays in the guaranteed ranges
        #[test]
        fn prop_output_always_within_bounds(
            ndvi in -2.0f64..2.0,
            moisture in -100.0f64..200.0,
        ) {
            let estimate = tokio_test::block_on(async {
                let estimator = MetricsEstimator::new(vec![Box::new(FixedSource {
                    name: "primary_remote",
                    reading: TierReading {
                        ndvi,
                        soil_moisture: moisture,
                    },
                    calls: Arc::new(AtomicUsize::new(0)),
                })]);
                estimator.estimate(&square_ring()).await
            })
            .unwrap();

            prop_assert!(estimate.ndvi >= NDVI_RANGE.0 && estimate.ndvi <= NDVI_RANGE.1);
            prop_assert!(
                estimate.soil_moisture >= SOIL_MOISTURE_RANGE.0
                    && estimate.soil_moisture <= SOIL_MOISTURE_RANGE.1
            );
        }
    }
}
