use uuid::Uuid;

use crate::api::error;
use crate::modules::event::model::{CreateEventModel, MemberResponse};
use crate::modules::event::schema::{
    EventEntity, ParticipationRequestEntity, ParticipationRequestRow,
};
use crate::modules::request::lifecycle::RequestFlow;

#[async_trait::async_trait]
pub trait EventRepository {
    async fn find_event_by_id(
        &self,
        event_id: &Uuid,
    ) -> Result<Option<EventEntity>, error::SystemError>;

    async fn create_event(
        &self,
        organizer_id: &Uuid,
        event: &CreateEventModel,
    ) -> Result<EventEntity, error::SystemError>;

    async fn list_upcoming(&self, limit: i32) -> Result<Vec<EventEntity>, error::SystemError>;

    async fn list_members(
        &self,
        event_id: &Uuid,
    ) -> Result<Vec<MemberResponse>, error::SystemError>;

    async fn is_member(
        &self,
        event_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<bool, error::SystemError>;
}

#[async_trait::async_trait]
pub trait ParticipationRepository {
    /// Finds a pending request for the (user, event) pair.
    async fn find_pending_for(
        &self,
        user_id: &Uuid,
        event_id: &Uuid,
    ) -> Result<Option<ParticipationRequestEntity>, error::SystemError>;

    async fn find_request_by_id(
        &self,
        request_id: &Uuid,
    ) -> Result<Option<ParticipationRequestRow>, error::SystemError>;

    async fn list_requests_by_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<ParticipationRequestEntity>, error::SystemError>;

    async fn list_pending_for_event(
        &self,
        event_id: &Uuid,
    ) -> Result<Vec<ParticipationRequestEntity>, error::SystemError>;

    async fn create_request(
        &self,
        user_id: &Uuid,
        event_id: &Uuid,
    ) -> Result<ParticipationRequestEntity, error::SystemError>;
}

pub trait EventRepo:
    EventRepository
    + ParticipationRepository
    + RequestFlow<Request = ParticipationRequestRow>
    + Send
    + Sync
{
}
