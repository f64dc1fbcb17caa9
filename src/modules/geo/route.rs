use crate::modules::geo::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/geo")
            .service(record_presence)
            .service(nearby_users)
            .service(user_location)
            .service(distance_to_user)
            .service(nearby_events)
            .service(set_event_location)
            .service(event_location)
            .service(distance_to_event),
    );
}
