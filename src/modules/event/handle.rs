use actix_web::{get, post, web, HttpRequest};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::{
        event::{
            model::{CreateEventModel, MemberResponse},
            repository_pg::EventRepositoryPg,
            schema::{EventEntity, ParticipationRequestEntity, ParticipationRequestRow},
            service::EventService,
        },
        request::Decision,
        user::repository_pg::UserRepositoryPg,
    },
    utils::ValidatedJson,
};

pub type EventSvc = EventService<EventRepositoryPg, UserRepositoryPg>;

#[post("/")]
pub async fn create_event(
    event_service: web::Data<EventSvc>,
    body: ValidatedJson<CreateEventModel>,
    req: HttpRequest,
) -> Result<success::Success<EventEntity>, error::Error> {
    let organizer_id = get_claims(&req)?.sub;
    let event = event_service.create_event(organizer_id, body.0).await?;

    Ok(success::Success::created(Some(event)).message("Event created successfully"))
}

#[get("/")]
pub async fn list_events(
    event_service: web::Data<EventSvc>,
) -> Result<success::Success<Vec<EventEntity>>, error::Error> {
    let events = event_service.list_upcoming().await?;
    Ok(success::Success::ok(Some(events)).message("Events retrieved successfully"))
}

#[get("/{event_id}")]
pub async fn get_event(
    event_service: web::Data<EventSvc>,
    event_id: web::Path<Uuid>,
) -> Result<success::Success<EventEntity>, error::Error> {
    let event = event_service.get_event(*event_id).await?;
    Ok(success::Success::ok(Some(event)).message("Event retrieved successfully"))
}

#[get("/{event_id}/members")]
pub async fn list_members(
    event_service: web::Data<EventSvc>,
    event_id: web::Path<Uuid>,
) -> Result<success::Success<Vec<MemberResponse>>, error::Error> {
    let members = event_service.get_members(*event_id).await?;
    Ok(success::Success::ok(Some(members)).message("Members retrieved successfully"))
}

#[post("/{event_id}/participation")]
pub async fn request_participation(
    event_service: web::Data<EventSvc>,
    event_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<ParticipationRequestEntity>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let request = event_service.request_participation(user_id, *event_id).await?;

    Ok(success::Success::created(Some(request))
        .message("Participation request sent successfully"))
}

#[get("/{event_id}/participation")]
pub async fn list_event_requests(
    event_service: web::Data<EventSvc>,
    event_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<Vec<ParticipationRequestEntity>>, error::Error> {
    let organizer_id = get_claims(&req)?.sub;
    let requests = event_service.list_event_requests(organizer_id, *event_id).await?;

    Ok(success::Success::ok(Some(requests))
        .message("Participation requests retrieved successfully"))
}

#[get("/participation/my")]
pub async fn list_my_requests(
    event_service: web::Data<EventSvc>,
    req: HttpRequest,
) -> Result<success::Success<Vec<ParticipationRequestEntity>>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let requests = event_service.list_my_requests(user_id).await?;

    Ok(success::Success::ok(Some(requests))
        .message("Participation requests retrieved successfully"))
}

#[post("/participation/{request_id}/accept")]
pub async fn accept_participation(
    event_service: web::Data<EventSvc>,
    request_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<ParticipationRequestRow>, error::Error> {
    let responder_id = get_claims(&req)?.sub;
    let request = event_service.respond(responder_id, *request_id, Decision::Accept).await?;

    Ok(success::Success::ok(Some(request)).message("Participation request accepted successfully"))
}

#[post("/participation/{request_id}/decline")]
pub async fn decline_participation(
    event_service: web::Data<EventSvc>,
    request_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<ParticipationRequestRow>, error::Error> {
    let responder_id = get_claims(&req)?.sub;
    let request = event_service.respond(responder_id, *request_id, Decision::Decline).await?;

    Ok(success::Success::ok(Some(request)).message("Participation request declined successfully"))
}
