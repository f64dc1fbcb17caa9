use uuid::Uuid;

use crate::api::error;
use crate::modules::geo::distance::Point;
use crate::modules::geo::model::{EventLocationRow, UserLocationRow};
use crate::modules::geo::schema::{EventLocationEntity, UserLocationEntity};

/// Last-known-location store. One record per subject; upserts are
/// last-writer-wins and atomic at the row level.
#[async_trait::async_trait]
pub trait LocationRepository {
    async fn upsert_user_location(
        &self,
        user_id: &Uuid,
        position: Point,
    ) -> Result<(), error::SystemError>;

    async fn find_user_location(
        &self,
        user_id: &Uuid,
    ) -> Result<Option<UserLocationEntity>, error::SystemError>;

    /// All user locations except the given subject, joined with display
    /// fields, for bulk proximity scans.
    async fn list_user_locations(
        &self,
        exclude_user_id: &Uuid,
    ) -> Result<Vec<UserLocationRow>, error::SystemError>;

    async fn upsert_event_location(
        &self,
        event_id: &Uuid,
        position: Point,
    ) -> Result<(), error::SystemError>;

    async fn find_event_location(
        &self,
        event_id: &Uuid,
    ) -> Result<Option<EventLocationEntity>, error::SystemError>;

    async fn list_event_locations(&self) -> Result<Vec<EventLocationRow>, error::SystemError>;
}
