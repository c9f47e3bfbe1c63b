//! Route definitions for the CropSight field dashboard

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/fields", field_routes())
}

/// Field management routes
fn field_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_fields).post(handlers::create_field),
        )
        .route(
            "/selected",
            get(handlers::get_selected_field).put(handlers::set_selected_field),
        )
        .route(
            "/:field_id",
            get(handlers::get_field)
                .put(handlers::redraw_field)
                .delete(handlers::delete_field),
        )
        .route("/:field_id/refresh-yield", post(handlers::refresh_yield))
        .route(
            "/:field_id/refresh-weather",
            post(handlers::refresh_weather),
        )
        .route("/:field_id/history", get(handlers::get_metric_history))
}
