use actix_web::{get, post, web, HttpRequest};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::{
        event::repository_pg::EventRepositoryPg,
        geo::{
            model::{
                DistanceResponse, LocationResponse, NearbyEvent, NearbyQuery, NearbyUser,
                PositionModel,
            },
            repository_pg::LocationRepositoryPg,
            service::GeoService,
        },
    },
    utils::{ValidatedJson, ValidatedQuery},
};

pub type GeoSvc = GeoService<LocationRepositoryPg, EventRepositoryPg>;

#[post("/presence")]
pub async fn record_presence(
    geo_service: web::Data<GeoSvc>,
    body: ValidatedJson<PositionModel>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    geo_service.record_presence(user_id, body.0.lat, body.0.lon).await?;
    Ok(success::Success::no_content())
}

#[get("/users/distances")]
pub async fn nearby_users(
    geo_service: web::Data<GeoSvc>,
    query: ValidatedQuery<NearbyQuery>,
    req: HttpRequest,
) -> Result<success::Success<Vec<NearbyUser>>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let nearby = geo_service.nearby_users(user_id, query.0.search).await?;

    Ok(success::Success::ok(Some(nearby)).message("Nearby users retrieved successfully"))
}

#[get("/users/{user_id}/location")]
pub async fn user_location(
    geo_service: web::Data<GeoSvc>,
    user_id: web::Path<Uuid>,
) -> Result<success::Success<LocationResponse>, error::Error> {
    let location = geo_service.user_location(*user_id).await?;
    Ok(success::Success::ok(Some(location)).message("Location retrieved successfully"))
}

#[get("/users/{user_id}/distance")]
pub async fn distance_to_user(
    geo_service: web::Data<GeoSvc>,
    user_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<DistanceResponse>, error::Error> {
    let requester_id = get_claims(&req)?.sub;
    let distance = geo_service.distance_to_user(requester_id, *user_id).await?;

    Ok(success::Success::ok(Some(distance)).message("Distance retrieved successfully"))
}

#[get("/events/distances")]
pub async fn nearby_events(
    geo_service: web::Data<GeoSvc>,
    query: ValidatedQuery<NearbyQuery>,
    req: HttpRequest,
) -> Result<success::Success<Vec<NearbyEvent>>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let nearby = geo_service.nearby_events(user_id, query.0.search).await?;

    Ok(success::Success::ok(Some(nearby)).message("Nearby events retrieved successfully"))
}

#[get("/events/{event_id}/location")]
pub async fn event_location(
    geo_service: web::Data<GeoSvc>,
    event_id: web::Path<Uuid>,
) -> Result<success::Success<LocationResponse>, error::Error> {
    let location = geo_service.event_location(*event_id).await?;
    Ok(success::Success::ok(Some(location)).message("Location retrieved successfully"))
}

#[post("/events/{event_id}/location")]
pub async fn set_event_location(
    geo_service: web::Data<GeoSvc>,
    event_id: web::Path<Uuid>,
    body: ValidatedJson<PositionModel>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let organizer_id = get_claims(&req)?.sub;
    geo_service.set_event_location(organizer_id, *event_id, body.0.lat, body.0.lon).await?;
    Ok(success::Success::no_content())
}

#[get("/events/{event_id}/distance")]
pub async fn distance_to_event(
    geo_service: web::Data<GeoSvc>,
    event_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<DistanceResponse>, error::Error> {
    let requester_id = get_claims(&req)?.sub;
    let distance = geo_service.distance_to_event(requester_id, *event_id).await?;

    Ok(success::Success::ok(Some(distance)).message("Distance retrieved successfully"))
}
