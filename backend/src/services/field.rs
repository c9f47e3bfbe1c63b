//! Field management service
//!
//! Orchestrates the estimation pipeline against persistence: create from a
//! drawn ring, redraw, refresh actions, reads and deletes. Every mutation
//! that runs the pipeline participates in the per-field generation counter,
//! so a superseded run never clobbers newer state.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use shared::{
    validate_field_name, validate_ring, CropType, Field, GeoPoint, MetricKind, MetricPoint,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::external::WeatherClient;
use crate::pipeline::{FieldDraft, FieldPipeline, GenerationCounter};
use crate::store::FieldStore;

/// Field service owning the pipeline, the store and the staleness tracking
pub struct FieldService {
    store: Arc<FieldStore>,
    pipeline: Arc<FieldPipeline>,
    weather_client: Option<WeatherClient>,
    generations: GenerationCounter,
}

/// Input for creating a field from a finalized drawing
#[derive(Debug, Deserialize)]
pub struct CreateFieldInput {
    pub name: String,
    /// Boundary ring as drawn; closure is handled by the pipeline
    pub ring: Vec<GeoPoint>,
    pub crop_type: Option<CropType>,
}

/// Input for redrawing a field's boundary
#[derive(Debug, Deserialize)]
pub struct RedrawFieldInput {
    pub ring: Vec<GeoPoint>,
    pub name: Option<String>,
}

impl FieldService {
    pub fn new(
        store: Arc<FieldStore>,
        pipeline: Arc<FieldPipeline>,
        weather_client: Option<WeatherClient>,
    ) -> Self {
        Self {
            store,
            pipeline,
            weather_client,
            generations: GenerationCounter::default(),
        }
    }

    /// Create a field from a drawn ring, running the full pipeline
    pub async fn create_field(&self, input: CreateFieldInput) -> AppResult<(Field, bool)> {
        validate_field_name(&input.name).map_err(|m| AppError::Validation {
            field: "name".to_string(),
            message: m.to_string(),
        })?;
        validate_ring(&input.ring).map_err(|m| AppError::Validation {
            field: "ring".to_string(),
            message: m.to_string(),
        })?;

        let draft = FieldDraft {
            id: Uuid::new_v4(),
            name: input.name,
            ring: input.ring,
            crop_type: input.crop_type.unwrap_or_default(),
            weather: None,
            created_at: Utc::now(),
        };

        let field = self
            .pipeline
            .build_field(draft)
            .await
            .ok_or_else(|| AppError::Internal("estimation produced no result".to_string()))?;

        let degraded = self.store.upsert(&field).await;
        Ok((field, degraded))
    }

    /// Redraw a field's boundary, re-running the pipeline
    ///
    /// Last-request-wins: if a newer redraw started while this one was
    /// estimating, the result is discarded and the newer state is returned.
    pub async fn redraw_field(
        &self,
        field_id: Uuid,
        input: RedrawFieldInput,
    ) -> AppResult<(Field, bool)> {
        let (existing, _) = self.store.get(field_id).await;
        let existing = existing.ok_or_else(|| AppError::NotFound("Field".to_string()))?;

        validate_ring(&input.ring).map_err(|m| AppError::Validation {
            field: "ring".to_string(),
            message: m.to_string(),
        })?;
        if let Some(ref name) = input.name {
            validate_field_name(name).map_err(|m| AppError::Validation {
                field: "name".to_string(),
                message: m.to_string(),
            })?;
        }

        let generation = self.generations.begin(field_id).await;

        let crop_type = existing
            .yield_estimate
            .as_ref()
            .map(|y| y.crop_type.clone())
            .unwrap_or_default();
        let draft = FieldDraft {
            id: field_id,
            name: input.name.unwrap_or_else(|| existing.name.clone()),
            ring: input.ring,
            crop_type,
            weather: existing.weather.clone(),
            created_at: existing.created_at,
        };

        let rebuilt = self
            .pipeline
            .build_field(draft)
            .await
            .ok_or_else(|| AppError::Internal("estimation produced no result".to_string()))?;

        if !self.generations.is_current(field_id, generation).await {
            tracing::info!(field_id = %field_id, "discarding superseded estimation run");
            let (latest, degraded) = self.store.get(field_id).await;
            return Ok((latest.unwrap_or(rebuilt), degraded));
        }

        let degraded = self.store.upsert(&rebuilt).await;
        Ok((rebuilt, degraded))
    }

    /// Recompute the yield estimate (and fresh metrics backing it)
    pub async fn refresh_yield(&self, field_id: Uuid) -> AppResult<(Field, bool)> {
        let (field, _) = self.store.get(field_id).await;
        let mut field = field.ok_or_else(|| AppError::NotFound("Field".to_string()))?;

        let generation = self.generations.begin(field_id).await;

        let (metrics, yield_estimate) = self
            .pipeline
            .refresh_estimates(&field)
            .await
            .ok_or_else(|| AppError::Internal("estimation produced no result".to_string()))?;

        if !self.generations.is_current(field_id, generation).await {
            tracing::info!(field_id = %field_id, "discarding superseded yield refresh");
            let (latest, degraded) = self.store.get(field_id).await;
            return Ok((latest.unwrap_or(field), degraded));
        }

        field.ndvi = Some(metrics.ndvi);
        let (min, max) = crate::pipeline::assembler::ndvi_window(metrics.ndvi);
        field.ndvi_min = Some(min);
        field.ndvi_max = Some(max);
        field.soil_moisture = Some(metrics.soil_moisture);
        field.metrics_source = Some(metrics.source);
        field.yield_estimate = Some(yield_estimate);
        field.last_updated = Utc::now();

        let degraded = self.store.upsert(&field).await;
        Ok((field, degraded))
    }

    /// Refresh the weather snapshot for a field's center point
    pub async fn refresh_weather(&self, field_id: Uuid) -> AppResult<(Field, bool)> {
        let (field, _) = self.store.get(field_id).await;
        let mut field = field.ok_or_else(|| AppError::NotFound("Field".to_string()))?;

        let client = self
            .weather_client
            .as_ref()
            .ok_or(AppError::WeatherServiceUnavailable)?;

        let snapshot = client.get_current_weather(field.center).await?;
        field.weather = Some(snapshot);
        field.last_updated = Utc::now();

        let degraded = self.store.upsert(&field).await;
        Ok((field, degraded))
    }

    pub async fn list_fields(&self) -> (Vec<Field>, bool) {
        self.store.list().await
    }

    pub async fn get_field(&self, field_id: Uuid) -> AppResult<(Field, bool)> {
        let (field, degraded) = self.store.get(field_id).await;
        let field = field.ok_or_else(|| AppError::NotFound("Field".to_string()))?;
        Ok((field, degraded))
    }

    pub async fn delete_field(&self, field_id: Uuid) -> AppResult<bool> {
        let (removed, degraded) = self.store.delete(field_id).await;
        if !removed {
            return Err(AppError::NotFound("Field".to_string()));
        }
        self.generations.forget(field_id).await;
        Ok(degraded)
    }

    /// History series for one metric of a field
    pub async fn metric_history(
        &self,
        field_id: Uuid,
        metric: MetricKind,
    ) -> AppResult<Vec<MetricPoint>> {
        let (field, _) = self.get_field(field_id).await?;
        Ok(match metric {
            MetricKind::Ndvi => field.ndvi_history,
            MetricKind::SoilMoisture => field.soil_moisture_history,
        })
    }

    /// Currently selected field, if any
    pub async fn selected_field(&self) -> AppResult<Option<Field>> {
        let Some(id) = self.store.selected().await else {
            return Ok(None);
        };
        let (field, _) = self.store.get(id).await;
        Ok(field)
    }

    /// Select a field (or clear the slot with `None`)
    pub async fn set_selected_field(&self, field_id: Option<Uuid>) -> AppResult<()> {
        if let Some(id) = field_id {
            let (field, _) = self.store.get(id).await;
            if field.is_none() {
                return Err(AppError::NotFound("Field".to_string()));
            }
        }
        self.store.set_selected(field_id).await;
        Ok(())
    }
}
