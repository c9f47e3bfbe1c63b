//! Field persistence with transparent cache fallback
//!
//! The database is the source of truth; every successful read or write also
//! lands in the in-process cache. When the database errors, reads serve from
//! the cache and writes land in the cache only, flagged as degraded. A
//! degraded result never fails the request.

use chrono::{DateTime, Utc};
use shared::{BoundingBox, Field, GeoPoint, MetricPoint, WeatherSnapshot, YieldEstimate};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::store::cache::LocalCache;

/// Field persistence: Postgres primary, cache fallback
pub struct FieldStore {
    db: PgPool,
    cache: LocalCache,
}

/// Database row shape for a field; JSON columns hold the nested structures
#[derive(FromRow)]
struct FieldRow {
    id: Uuid,
    name: String,
    polygon: Json<Vec<GeoPoint>>,
    area_m2: f64,
    area_hectares: f64,
    center: Json<GeoPoint>,
    bounding_box: Json<BoundingBox>,
    ndvi: Option<f64>,
    ndvi_min: Option<f64>,
    ndvi_max: Option<f64>,
    soil_moisture: Option<f64>,
    metrics_source: Option<String>,
    ndvi_history: Json<Vec<MetricPoint>>,
    soil_moisture_history: Json<Vec<MetricPoint>>,
    weather: Option<Json<WeatherSnapshot>>,
    yield_estimate: Option<Json<YieldEstimate>>,
    created_at: DateTime<Utc>,
    last_updated: DateTime<Utc>,
}

impl From<FieldRow> for Field {
    fn from(row: FieldRow) -> Self {
        Field {
            id: row.id,
            name: row.name,
            polygon: row.polygon.0,
            area_m2: row.area_m2,
            area_hectares: row.area_hectares,
            center: row.center.0,
            bounding_box: row.bounding_box.0,
            ndvi: row.ndvi,
            ndvi_min: row.ndvi_min,
            ndvi_max: row.ndvi_max,
            soil_moisture: row.soil_moisture,
            metrics_source: row.metrics_source,
            ndvi_history: row.ndvi_history.0,
            soil_moisture_history: row.soil_moisture_history.0,
            weather: row.weather.map(|w| w.0),
            yield_estimate: row.yield_estimate.map(|y| y.0),
            created_at: row.created_at,
            last_updated: row.last_updated,
        }
    }
}

const FIELD_COLUMNS: &str = "id, name, polygon, area_m2, area_hectares, center, bounding_box, \
     ndvi, ndvi_min, ndvi_max, soil_moisture, metrics_source, \
     ndvi_history, soil_moisture_history, weather, yield_estimate, \
     created_at, last_updated";

impl FieldStore {
    pub fn new(db: PgPool) -> Self {
        Self {
            db,
            cache: LocalCache::default(),
        }
    }

    /// Upsert a field by id; returns whether the write was degraded to
    /// cache-only
    pub async fn upsert(&self, field: &Field) -> bool {
        let degraded = match self.upsert_db(field).await {
            Ok(()) => false,
            Err(err) => {
                tracing::warn!(
                    field_id = %field.id,
                    error = %err,
                    "database write failed, field kept in local cache only"
                );
                true
            }
        };
        self.cache.put(field.clone()).await;
        degraded
    }

    /// Fetch a field by id; `(None, false)` means it genuinely does not exist
    ///
    /// A cache hit after a database miss means the original write never
    /// landed, so the cached copy is still served.
    pub async fn get(&self, id: Uuid) -> (Option<Field>, bool) {
        match self.fetch_db(id).await {
            Ok(Some(field)) => {
                self.cache.put(field.clone()).await;
                (Some(field), false)
            }
            Ok(None) => (self.cache.get(id).await, false),
            Err(err) => {
                tracing::warn!(field_id = %id, error = %err, "database read failed, serving cache");
                (self.cache.get(id).await, true)
            }
        }
    }

    /// All fields, oldest first
    ///
    /// When the database answers, cache-only records (from earlier degraded
    /// writes) are merged in so they do not vanish from the dashboard.
    pub async fn list(&self) -> (Vec<Field>, bool) {
        match self.fetch_all_db().await {
            Ok(mut fields) => {
                for cached in self.cache.all().await {
                    if !fields.iter().any(|f| f.id == cached.id) {
                        fields.push(cached);
                    }
                }
                fields.sort_by_key(|f| f.created_at);
                (fields, false)
            }
            Err(err) => {
                tracing::warn!(error = %err, "database list failed, serving cached fields");
                (self.cache.all().await, true)
            }
        }
    }

    /// Delete a field; returns `(removed, degraded)`
    pub async fn delete(&self, id: Uuid) -> (bool, bool) {
        let cache_removed = self.cache.remove(id).await;
        match sqlx::query("DELETE FROM fields WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
        {
            Ok(result) => (result.rows_affected() > 0 || cache_removed, false),
            Err(err) => {
                tracing::warn!(field_id = %id, error = %err, "database delete failed");
                (cache_removed, true)
            }
        }
    }

    /// Currently selected field id (session state, never persisted)
    pub async fn selected(&self) -> Option<Uuid> {
        self.cache.selected().await
    }

    pub async fn set_selected(&self, id: Option<Uuid>) {
        self.cache.set_selected(id).await;
    }

    async fn upsert_db(&self, field: &Field) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO fields (
                id, name, polygon, area_m2, area_hectares, center, bounding_box,
                ndvi, ndvi_min, ndvi_max, soil_moisture, metrics_source,
                ndvi_history, soil_moisture_history, weather, yield_estimate,
                created_at, last_updated
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                polygon = EXCLUDED.polygon,
                area_m2 = EXCLUDED.area_m2,
                area_hectares = EXCLUDED.area_hectares,
                center = EXCLUDED.center,
                bounding_box = EXCLUDED.bounding_box,
                ndvi = EXCLUDED.ndvi,
                ndvi_min = EXCLUDED.ndvi_min,
                ndvi_max = EXCLUDED.ndvi_max,
                soil_moisture = EXCLUDED.soil_moisture,
                metrics_source = EXCLUDED.metrics_source,
                ndvi_history = EXCLUDED.ndvi_history,
                soil_moisture_history = EXCLUDED.soil_moisture_history,
                weather = EXCLUDED.weather,
                yield_estimate = EXCLUDED.yield_estimate,
                last_updated = EXCLUDED.last_updated
            "#,
        )
        .bind(field.id)
        .bind(&field.name)
        .bind(Json(&field.polygon))
        .bind(field.area_m2)
        .bind(field.area_hectares)
        .bind(Json(&field.center))
        .bind(Json(&field.bounding_box))
        .bind(field.ndvi)
        .bind(field.ndvi_min)
        .bind(field.ndvi_max)
        .bind(field.soil_moisture)
        .bind(&field.metrics_source)
        .bind(Json(&field.ndvi_history))
        .bind(Json(&field.soil_moisture_history))
        .bind(field.weather.as_ref().map(Json))
        .bind(field.yield_estimate.as_ref().map(Json))
        .bind(field.created_at)
        .bind(field.last_updated)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn fetch_db(&self, id: Uuid) -> Result<Option<Field>, sqlx::Error> {
        let row = sqlx::query_as::<_, FieldRow>(&format!(
            "SELECT {} FROM fields WHERE id = $1",
            FIELD_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Field::from))
    }

    async fn fetch_all_db(&self) -> Result<Vec<Field>, sqlx::Error> {
        let rows = sqlx::query_as::<_, FieldRow>(&format!(
            "SELECT {} FROM fields ORDER BY created_at ASC",
            FIELD_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Field::from).collect())
    }
}
