use serde::Serialize;
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// Last known location of a user. One row per user, upsert-only.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserLocationEntity {
    pub user_id: Uuid,
    pub lat: f64,
    pub lon: f64,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Last known location of an event. One row per event, upsert-only.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EventLocationEntity {
    pub event_id: Uuid,
    pub lat: f64,
    pub lon: f64,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
