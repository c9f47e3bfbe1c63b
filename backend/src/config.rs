//! Configuration management for the CropSight backend
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with CROPSIGHT_ prefix
//!
//! Estimation endpoints and API keys are injected here rather than living as
//! constants anywhere in the pipeline.

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Metrics estimation tier configuration
    pub metrics: MetricsConfig,

    /// Weather API configuration
    pub weather: WeatherConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

/// Remote estimation tiers, attempted in declaration order
#[derive(Debug, Deserialize, Clone)]
pub struct MetricsConfig {
    /// Primary remote estimation endpoint
    pub primary_endpoint: String,

    /// Secondary estimation endpoint
    pub secondary_endpoint: String,

    /// Tertiary estimation endpoint
    pub tertiary_endpoint: String,

    /// Per-tier request timeout in milliseconds
    pub request_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// Weather API endpoint
    pub api_endpoint: String,

    /// Weather API key
    pub api_key: String,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("CROPSIGHT_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("metrics.request_timeout_ms", 8000)?
            .set_default(
                "weather.api_endpoint",
                "https://api.openweathermap.org/data/2.5",
            )?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (CROPSIGHT_ prefix)
            .add_source(
                Environment::with_prefix("CROPSIGHT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}
