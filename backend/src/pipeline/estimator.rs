//! Tiered metrics estimation with fallback
//!
//! Sources are attempted strictly in order; a tier failure advances to the
//! next tier and is logged, never surfaced. The final tier is the synthetic
//! model, which cannot fail, so an estimate is always produced for any
//! usable ring.

use serde::Serialize;
use shared::{close_ring, is_degenerate_ring, GeoPoint};
use tokio::sync::broadcast;

use crate::config::MetricsConfig;
use crate::external::metrics_api::{MetricsApiClient, TierError};
use crate::pipeline::synthetic::SyntheticModel;

/// NDVI bounds the estimator guarantees regardless of source
pub const NDVI_RANGE: (f64, f64) = (0.1, 0.9);

/// Soil moisture bounds the estimator guarantees regardless of source
pub const SOIL_MOISTURE_RANGE: (f64, f64) = (10.0, 50.0);

/// Raw reading produced by a single tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierReading {
    pub ndvi: f64,
    pub soil_moisture: f64,
}

/// One candidate data source in the fallback chain
#[axum::async_trait]
pub trait MetricSource: Send + Sync {
    /// Source tag recorded on the estimate
    fn name(&self) -> &str;

    /// Confidence attributed to this source, in [0, 1]
    fn accuracy(&self) -> f64;

    async fn estimate(&self, ring: &[GeoPoint]) -> Result<TierReading, TierError>;
}

/// Final estimate with its provenance
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldMetricsEstimate {
    pub ndvi: f64,
    pub soil_moisture: f64,
    pub source: String,
    pub accuracy: f64,
}

/// Tier-transition events, a side channel for status displays
///
/// Not part of the return contract; senders never block on slow or absent
/// subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EstimationProgress {
    Trying { source: String },
    TierFailed { source: String },
    Resolved { source: String },
}

/// Ordered fallback chain over metric sources
pub struct MetricsEstimator {
    sources: Vec<Box<dyn MetricSource>>,
    progress: broadcast::Sender<EstimationProgress>,
}

impl MetricsEstimator {
    /// Build an estimator from an explicit source chain
    pub fn new(sources: Vec<Box<dyn MetricSource>>) -> Self {
        let (progress, _) = broadcast::channel(32);
        Self { sources, progress }
    }

    /// Subscribe to tier-transition events
    pub fn subscribe(&self) -> broadcast::Receiver<EstimationProgress> {
        self.progress.subscribe()
    }

    /// Build the standard chain: three remote tiers, then the synthetic model
    pub fn from_config(config: &MetricsConfig) -> Self {
        let timeout = std::time::Duration::from_millis(config.request_timeout_ms);
        Self::new(vec![
            Box::new(MetricsApiClient::new(
                config.primary_endpoint.clone(),
                "primary_remote",
                0.90,
                timeout,
            )),
            Box::new(MetricsApiClient::new(
                config.secondary_endpoint.clone(),
                "secondary_remote",
                0.85,
                timeout,
            )),
            Box::new(MetricsApiClient::new(
                config.tertiary_endpoint.clone(),
                "tertiary_remote",
                0.78,
                timeout,
            )),
            Box::new(SyntheticModel),
        ])
    }

    /// Estimate NDVI and soil moisture for a boundary ring
    ///
    /// Returns `None` for a degenerate ring without touching any source.
    /// Otherwise a result is always produced, clamped to the estimator's
    /// guaranteed ranges.
    pub async fn estimate(&self, ring: &[GeoPoint]) -> Option<FieldMetricsEstimate> {
        if is_degenerate_ring(ring) {
            tracing::debug!("skipping estimation for degenerate ring");
            return None;
        }

        let closed = close_ring(ring);
        for source in &self.sources {
            self.notify(EstimationProgress::Trying {
                source: source.name().to_string(),
            });
            match source.estimate(&closed).await {
                Ok(reading) => {
                    tracing::info!(source = source.name(), "metrics estimate resolved");
                    self.notify(EstimationProgress::Resolved {
                        source: source.name().to_string(),
                    });
                    return Some(FieldMetricsEstimate {
                        ndvi: reading.ndvi.clamp(NDVI_RANGE.0, NDVI_RANGE.1),
                        soil_moisture: reading
                            .soil_moisture
                            .clamp(SOIL_MOISTURE_RANGE.0, SOIL_MOISTURE_RANGE.1),
                        source: source.name().to_string(),
                        accuracy: source.accuracy(),
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        source = source.name(),
                        error = %err,
                        "estimation tier failed, trying next source"
                    );
                    self.notify(EstimationProgress::TierFailed {
                        source: source.name().to_string(),
                    });
                }
            }
        }

        None
    }

    fn notify(&self, event: EstimationProgress) {
        // No subscribers is fine
        let _ = self.progress.send(event);
    }
}
