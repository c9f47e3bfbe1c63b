//! Remote metrics API client
//!
//! One client per estimation tier. All three remote tiers share the same
//! contract: POST the closed boundary ring, receive NDVI and soil moisture.
//! Failures here are tier-local and feed the fallback chain; they never
//! surface as application errors.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::GeoPoint;
use thiserror::Error;

use crate::pipeline::estimator::{MetricSource, TierReading};

/// A failure of a single estimation tier
#[derive(Debug, Error)]
pub enum TierError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed response body: {0}")]
    Malformed(String),
}

/// Client for one remote estimation tier
#[derive(Clone)]
pub struct MetricsApiClient {
    http_client: Client,
    endpoint: String,
    tier_name: String,
    accuracy: f64,
}

/// Request body carrying the closed boundary ring
#[derive(Debug, Serialize)]
struct EstimateRequest<'a> {
    coords: &'a [GeoPoint],
}

/// Expected response body from every remote tier
#[derive(Debug, Deserialize)]
struct EstimateResponse {
    ndvi: f64,
    soil_moisture: f64,
}

impl MetricsApiClient {
    /// Create a client for one tier
    pub fn new(endpoint: String, tier_name: &str, accuracy: f64, timeout: Duration) -> Self {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http_client,
            endpoint,
            tier_name: tier_name.to_string(),
            accuracy,
        }
    }

    async fn fetch(&self, ring: &[GeoPoint]) -> Result<TierReading, TierError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&EstimateRequest { coords: ring })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TierError::Status(response.status()));
        }

        let body: EstimateResponse = response
            .json()
            .await
            .map_err(|e| TierError::Malformed(e.to_string()))?;

        if !body.ndvi.is_finite() || !body.soil_moisture.is_finite() {
            return Err(TierError::Malformed(
                "non-finite metric values".to_string(),
            ));
        }

        Ok(TierReading {
            ndvi: body.ndvi,
            soil_moisture: body.soil_moisture,
        })
    }
}

#[axum::async_trait]
impl MetricSource for MetricsApiClient {
    fn name(&self) -> &str {
        &self.tier_name
    }

    fn accuracy(&self) -> f64 {
        self.accuracy
    }

    async fn estimate(&self, ring: &[GeoPoint]) -> Result<TierReading, TierError> {
        self.fetch(ring).await
    }
}
