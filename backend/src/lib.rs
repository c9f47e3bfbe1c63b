//! CropSight backend library
//!
//! Hosts the Field Metrics Pipeline and the HTTP surface around it. Split
//! from the binary so integration tests can exercise the pipeline directly.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod pipeline;
pub mod routes;
pub mod services;
pub mod store;

pub use config::Config;

use services::FieldService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
    pub fields: Arc<FieldService>,
}
