use serde::Serialize;
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::modules::request::RequestStatus;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EventEntity {
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub name: String,
    pub description: String,
    pub event_type: Option<String>,
    pub address: Option<String>,
    pub starts_at: chrono::DateTime<chrono::Utc>,
    pub ends_at: Option<chrono::DateTime<chrono::Utc>>,
    pub min_count_members: Option<i32>,
    pub max_count_members: Option<i32>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub price: Option<f64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ParticipationRequestEntity {
    pub id: Uuid,
    pub from_user_id: Uuid,
    pub event_id: Uuid,
    pub status: RequestStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Participation request joined with the event's organizer; the lifecycle
/// driver resolves the authorized responder from it without a second query.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ParticipationRequestRow {
    pub id: Uuid,
    pub from_user_id: Uuid,
    pub event_id: Uuid,
    pub status: RequestStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub organizer_id: Uuid,
}
