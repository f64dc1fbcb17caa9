use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Deserialize, Validate)]
pub struct PositionModel {
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub lon: f64,
}

#[derive(Deserialize, Validate)]
pub struct NearbyQuery {
    /// Radius in kilometers; the configured default applies when absent.
    #[validate(range(min = 0.0, message = "Search radius cannot be negative"))]
    pub search: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationResponse {
    pub lat: f64,
    pub lon: f64,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DistanceResponse {
    pub distance_km: f64,
}

/// Location row joined with the user's display fields for proximity scans.
#[derive(Debug, Clone, FromRow)]
pub struct UserLocationRow {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, FromRow)]
pub struct EventLocationRow {
    pub event_id: Uuid,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NearbyUser {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub distance_km: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NearbyEvent {
    pub event_id: Uuid,
    pub name: String,
    pub distance_km: f64,
}
