//! The field metrics pipeline
//!
//! Single-pass transformation from a drawn boundary ring to a full Field
//! record: geometry extraction, tiered metrics estimation, history
//! back-fill, yield projection, recommendations, assembly. Each invocation
//! is independent; staleness across rapid redraws is handled by the caller
//! with a generation counter.

pub mod assembler;
pub mod estimator;
pub mod history;
pub mod synthetic;
pub mod yield_model;

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};
use shared::recommend::{recommend, AgronomicIndicators};
use shared::{
    close_ring, extract_geometry, CropType, Field, GeoPoint, MetricKind, WeatherSnapshot,
    YieldEstimate,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::MetricsConfig;
use assembler::{assemble_field, FieldParts};
use estimator::{EstimationProgress, FieldMetricsEstimate, MetricsEstimator};
use history::{generate_metric_history, generate_yield_history};
use synthetic::ring_seed;
use yield_model::project_yield;

/// Points in a generated daily series
pub const DAILY_HISTORY_POINTS: usize = 30;

/// Points in a generated yearly yield series
pub const YEARLY_HISTORY_POINTS: usize = 5;

/// Inputs for building a new Field from a drawn ring
pub struct FieldDraft {
    pub id: Uuid,
    pub name: String,
    pub ring: Vec<GeoPoint>,
    pub crop_type: CropType,
    pub weather: Option<WeatherSnapshot>,
    pub created_at: DateTime<Utc>,
}

/// Orchestrates the estimation pipeline for one field at a time
pub struct FieldPipeline {
    estimator: MetricsEstimator,
}

impl FieldPipeline {
    pub fn new(estimator: MetricsEstimator) -> Self {
        Self { estimator }
    }

    pub fn from_config(config: &MetricsConfig) -> Self {
        Self::new(MetricsEstimator::from_config(config))
    }

    /// Subscribe to tier-transition progress events
    pub fn subscribe_progress(&self) -> tokio::sync::broadcast::Receiver<EstimationProgress> {
        self.estimator.subscribe()
    }

    /// Run the full pipeline for a drawn ring
    ///
    /// Returns `None` for a degenerate ring (the deliberate no-op case).
    pub async fn build_field(&self, draft: FieldDraft) -> Option<Field> {
        let metrics = self.estimator.estimate(&draft.ring).await?;
        let geometry = extract_geometry(&draft.ring)?;
        let closed = close_ring(&draft.ring);
        let today = Utc::now().date_naive();

        let ndvi_history = generate_metric_history(
            metrics.ndvi,
            MetricKind::Ndvi,
            DAILY_HISTORY_POINTS,
            today,
            ring_seed(&closed, today, "ndvi_history"),
        );
        let soil_moisture_history = generate_metric_history(
            metrics.soil_moisture,
            MetricKind::SoilMoisture,
            DAILY_HISTORY_POINTS,
            today,
            ring_seed(&closed, today, "soil_moisture_history"),
        );

        let yield_estimate = self.build_yield_estimate(
            &closed,
            geometry.center.latitude,
            &metrics,
            &draft.crop_type,
        );

        Some(assemble_field(FieldParts {
            id: draft.id,
            name: draft.name,
            polygon: closed,
            geometry,
            metrics: Some(metrics),
            ndvi_history,
            soil_moisture_history,
            weather: draft.weather,
            yield_estimate: Some(yield_estimate),
            created_at: draft.created_at,
        }))
    }

    /// Re-run estimation for an existing field, producing fresh metrics and
    /// a fresh yield estimate
    ///
    /// Histories are left alone; spec-wise they are regenerated only when
    /// absent, which happens in `build_field`.
    pub async fn refresh_estimates(
        &self,
        field: &Field,
    ) -> Option<(FieldMetricsEstimate, YieldEstimate)> {
        let metrics = self.estimator.estimate(&field.polygon).await?;
        let crop_type = field
            .yield_estimate
            .as_ref()
            .map(|y| y.crop_type.clone())
            .unwrap_or_default();

        let yield_estimate = self.build_yield_estimate(
            &field.polygon,
            field.center.latitude,
            &metrics,
            &crop_type,
        );

        Some((metrics, yield_estimate))
    }

    fn build_yield_estimate(
        &self,
        closed_ring: &[GeoPoint],
        latitude: f64,
        metrics: &FieldMetricsEstimate,
        crop_type: &CropType,
    ) -> YieldEstimate {
        let today = Utc::now().date_naive();
        let figures = project_yield(
            crop_type,
            metrics.ndvi,
            latitude,
            ring_seed(closed_ring, today, "yield"),
        );

        let recommendations = recommend(&AgronomicIndicators {
            ndvi: metrics.ndvi,
            soil_moisture: metrics.soil_moisture,
            yield_gap: figures.yield_gap,
        });

        let yield_history = generate_yield_history(
            figures.current_yield,
            YEARLY_HISTORY_POINTS,
            today.year(),
            ring_seed(closed_ring, today, "yield_history"),
        );

        YieldEstimate {
            crop_type: crop_type.clone(),
            current_yield: figures.current_yield,
            potential_yield: figures.potential_yield,
            yield_gap: figures.yield_gap,
            recommendations,
            yield_history,
            accuracy: (metrics.accuracy * 0.85).clamp(0.0, 1.0),
            data_source: metrics.source.clone(),
        }
    }
}

/// Tracks the newest estimation run per field
///
/// Rapid polygon redraws start overlapping pipeline runs; only the result of
/// the last-initiated run may be written (last-request-wins). A run captures
/// its generation with `begin` and checks `is_current` before persisting.
#[derive(Default)]
pub struct GenerationCounter {
    runs: RwLock<HashMap<Uuid, u64>>,
}

impl GenerationCounter {
    /// Start a new run for a field, superseding any in-flight run
    pub async fn begin(&self, field_id: Uuid) -> u64 {
        let mut runs = self.runs.write().await;
        let generation = runs.entry(field_id).or_insert(0);
        *generation += 1;
        *generation
    }

    /// Whether a run is still the newest one for its field
    pub async fn is_current(&self, field_id: Uuid, generation: u64) -> bool {
        self.runs.read().await.get(&field_id) == Some(&generation)
    }

    /// Drop tracking for a deleted field
    pub async fn forget(&self, field_id: Uuid) {
        self.runs.write().await.remove(&field_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_newer_generation_supersedes_older() {
        let counter = GenerationCounter::default();
        let id = Uuid::new_v4();

        let first = counter.begin(id).await;
        assert!(counter.is_current(id, first).await);

        let second = counter.begin(id).await;
        assert!(!counter.is_current(id, first).await);
        assert!(counter.is_current(id, second).await);
    }

    #[tokio::test]
    async fn test_fields_are_tracked_independently() {
        let counter = GenerationCounter::default();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let gen_a = counter.begin(a).await;
        counter.begin(b).await;
        counter.begin(b).await;

        assert!(counter.is_current(a, gen_a).await);
    }

    #[tokio::test]
    async fn test_forget_clears_tracking() {
        let counter = GenerationCounter::default();
        let id = Uuid::new_v4();

        let generation = counter.begin(id).await;
        counter.forget(id).await;
        assert!(!counter.is_current(id, generation).await);
    }
}
