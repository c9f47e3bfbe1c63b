//! CropSight Field Dashboard - Backend Server
//!
//! Precision-agriculture dashboard backend: field polygons drawn on the map
//! are turned into NDVI, soil moisture, weather and yield figures through
//! the field metrics pipeline, and persisted with a local cache fallback.

use axum::{routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cropsight_backend::external::WeatherClient;
use cropsight_backend::pipeline::FieldPipeline;
use cropsight_backend::services::FieldService;
use cropsight_backend::store::FieldStore;
use cropsight_backend::{routes, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cropsight_backend=debug,tower_http=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting CropSight Field Dashboard Server");
    tracing::info!("Environment: {}", config.environment);

    // Lazy pool: the dashboard must come up and serve from the cache even
    // when the database is unreachable
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect_lazy(&config.database.url)?;

    // Run migrations in development
    if config.environment == "development" {
        match sqlx::migrate!("./migrations").run(&db_pool).await {
            Ok(()) => tracing::info!("Migrations completed"),
            Err(err) => tracing::warn!("Skipping migrations, database unreachable: {}", err),
        }
    }

    // Wire the pipeline and its collaborators
    let store = Arc::new(FieldStore::new(db_pool.clone()));
    let pipeline = Arc::new(FieldPipeline::from_config(&config.metrics));
    let weather_client = (!config.weather.api_key.is_empty()).then(|| {
        WeatherClient::new(
            config.weather.api_key.clone(),
            config.weather.api_endpoint.clone(),
        )
    });
    let fields = Arc::new(FieldService::new(store, pipeline, weather_client));

    let state = AppState {
        db: db_pool,
        config: Arc::new(config.clone()),
        fields,
    };

    // Build application
    let app = create_app(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "CropSight Field Dashboard API v1.0"
}
