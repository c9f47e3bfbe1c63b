//! Field management HTTP handlers
//!
//! Thin wrappers over `FieldService`. Responses carry a `degraded` flag when
//! persistence fell back to the local cache; the request itself still
//! succeeds.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use shared::{Field, MetricKind, MetricPoint};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::field::{CreateFieldInput, RedrawFieldInput};
use crate::AppState;

#[derive(Serialize)]
pub struct FieldEnvelope {
    pub field: Field,
    pub degraded: bool,
}

#[derive(Serialize)]
pub struct FieldListEnvelope {
    pub fields: Vec<Field>,
    pub degraded: bool,
}

#[derive(Serialize)]
pub struct HistoryEnvelope {
    pub metric: MetricKind,
    pub points: Vec<MetricPoint>,
}

#[derive(Serialize)]
pub struct SelectedEnvelope {
    pub field: Option<Field>,
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub metric: MetricKind,
}

#[derive(Deserialize)]
pub struct SelectFieldInput {
    pub field_id: Option<Uuid>,
}

/// List all fields
pub async fn list_fields(State(state): State<AppState>) -> Json<FieldListEnvelope> {
    let (fields, degraded) = state.fields.list_fields().await;
    Json(FieldListEnvelope { fields, degraded })
}

/// Create a field from a drawn boundary ring
pub async fn create_field(
    State(state): State<AppState>,
    Json(input): Json<CreateFieldInput>,
) -> AppResult<(StatusCode, Json<FieldEnvelope>)> {
    let (field, degraded) = state.fields.create_field(input).await?;
    Ok((StatusCode::CREATED, Json(FieldEnvelope { field, degraded })))
}

/// Get a field by id
pub async fn get_field(
    State(state): State<AppState>,
    Path(field_id): Path<Uuid>,
) -> AppResult<Json<FieldEnvelope>> {
    let (field, degraded) = state.fields.get_field(field_id).await?;
    Ok(Json(FieldEnvelope { field, degraded }))
}

/// Redraw a field's boundary, re-running estimation
pub async fn redraw_field(
    State(state): State<AppState>,
    Path(field_id): Path<Uuid>,
    Json(input): Json<RedrawFieldInput>,
) -> AppResult<Json<FieldEnvelope>> {
    let (field, degraded) = state.fields.redraw_field(field_id, input).await?;
    Ok(Json(FieldEnvelope { field, degraded }))
}

/// Delete a field
pub async fn delete_field(
    State(state): State<AppState>,
    Path(field_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.fields.delete_field(field_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Recompute the yield estimate for a field
pub async fn refresh_yield(
    State(state): State<AppState>,
    Path(field_id): Path<Uuid>,
) -> AppResult<Json<FieldEnvelope>> {
    let (field, degraded) = state.fields.refresh_yield(field_id).await?;
    Ok(Json(FieldEnvelope { field, degraded }))
}

/// Refresh the weather snapshot for a field
pub async fn refresh_weather(
    State(state): State<AppState>,
    Path(field_id): Path<Uuid>,
) -> AppResult<Json<FieldEnvelope>> {
    let (field, degraded) = state.fields.refresh_weather(field_id).await?;
    Ok(Json(FieldEnvelope { field, degraded }))
}

/// History series for charts
pub async fn get_metric_history(
    State(state): State<AppState>,
    Path(field_id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<HistoryEnvelope>> {
    let points = state.fields.metric_history(field_id, query.metric).await?;
    Ok(Json(HistoryEnvelope {
        metric: query.metric,
        points,
    }))
}

/// Currently selected field
pub async fn get_selected_field(
    State(state): State<AppState>,
) -> AppResult<Json<SelectedEnvelope>> {
    let field = state.fields.selected_field().await?;
    Ok(Json(SelectedEnvelope { field }))
}

/// Select a field, or clear the selection with a null id
pub async fn set_selected_field(
    State(state): State<AppState>,
    Json(input): Json<SelectFieldInput>,
) -> AppResult<StatusCode> {
    state.fields.set_selected_field(input.field_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
