use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Deserialize, Validate)]
pub struct CreateEventModel {
    #[validate(length(min = 2, max = 50, message = "Name must be 2 to 50 characters long"))]
    pub name: String,
    #[validate(length(min = 1, max = 500, message = "Description must be 1 to 500 characters long"))]
    pub description: String,
    pub event_type: Option<String>,
    pub address: Option<String>,
    pub starts_at: chrono::DateTime<chrono::Utc>,
    pub ends_at: Option<chrono::DateTime<chrono::Utc>>,
    #[validate(range(min = 1, message = "Minimum member count must be positive"))]
    pub min_count_members: Option<i32>,
    #[validate(range(min = 1, message = "Maximum member count must be positive"))]
    pub max_count_members: Option<i32>,
    #[validate(range(min = 0, message = "Minimum age cannot be negative"))]
    pub min_age: Option<i32>,
    #[validate(range(min = 0, message = "Maximum age cannot be negative"))]
    pub max_age: Option<i32>,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MemberResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
}
