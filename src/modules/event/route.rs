use crate::modules::event::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/events")
            .service(create_event)
            .service(list_events)
            .service(list_my_requests)
            .service(accept_participation)
            .service(decline_participation)
            .service(request_participation)
            .service(list_event_requests)
            .service(list_members)
            .service(get_event),
    );
}
