use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web, Error, HttpMessage, HttpRequest,
};
use futures_util::{future::LocalBoxFuture, FutureExt};
use std::rc::Rc;

use crate::{
    api::error, modules::geo::handle::GeoSvc, modules::user::schema::UserRole, utils::Claims, ENV,
};

pub async fn authentication<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<B>, Error>
where
    B: MessageBody + 'static,
{
    let auth = req.headers().get("Authorization").and_then(|h| h.to_str().ok());
    let token = match auth.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(t) => t,
        None => {
            return Err(error::Error::unauthorized("Token Invalid or Expired").into());
        }
    };

    let claims = Claims::decode(token, ENV.jwt_secret.as_ref())
        .map_err(|_| error::Error::forbidden("Token Invalid or Expired"))?;

    req.extensions_mut().insert(claims);

    next.call(req).await
}

pub fn get_claims(req: &HttpRequest) -> Result<Claims, error::Error> {
    let extensions = req.extensions();

    let claims = extensions
        .get::<Claims>()
        .ok_or_else(|| error::Error::unauthorized("Unauthorized"))?
        .clone();

    Ok(claims)
}

pub fn authorization<B>(
    allowed_roles: Vec<UserRole>,
) -> impl Fn(
    ServiceRequest,
    Next<B>,
) -> LocalBoxFuture<'static, Result<ServiceResponse<B>, actix_web::Error>>
where
    B: MessageBody + 'static,
{
    let allowed_roles = Rc::new(allowed_roles);
    move |req: ServiceRequest, next: Next<B>| {
        let roles = allowed_roles.clone();
        async move {
            let role = get_claims(req.request())?.role;

            if !roles.contains(&role) {
                return Err(error::Error::forbidden("No permission").into());
            }
            next.call(req).await
        }
        .boxed_local()
    }
}

/// Updates the caller's last known position from the `X-Position: lat,lon`
/// header. Presence capture is best effort: a malformed header or a failed
/// write is logged and the request proceeds untouched.
pub async fn capture_presence<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<B>, Error>
where
    B: MessageBody + 'static,
{
    if let Some(raw) = req.headers().get("X-Position").and_then(|h| h.to_str().ok()) {
        match parse_position(raw) {
            Some((lat, lon)) => {
                let user_id = req.extensions().get::<Claims>().map(|claims| claims.sub);
                if let (Some(user_id), Some(geo_service)) =
                    (user_id, req.app_data::<web::Data<GeoSvc>>())
                {
                    if let Err(err) = geo_service.record_presence(user_id, lat, lon).await {
                        log::warn!("Failed to record presence for user {user_id}: {err}");
                    }
                }
            }
            None => log::warn!("Ignoring malformed X-Position header: {raw}"),
        }
    }

    next.call(req).await
}

fn parse_position(raw: &str) -> Option<(f64, f64)> {
    let (lat, lon) = raw.split_once(',')?;
    let lat = lat.trim().parse::<f64>().ok()?;
    let lon = lon.trim().parse::<f64>().ok()?;

    Some((lat, lon))
}

#[cfg(test)]
mod tests {
    use super::parse_position;

    #[test]
    fn parses_lat_lon_pair() {
        assert_eq!(parse_position("55.75, 37.62"), Some((55.75, 37.62)));
        assert_eq!(parse_position("-12.5,120.0"), Some((-12.5, 120.0)));
    }

    #[test]
    fn rejects_malformed_headers() {
        assert_eq!(parse_position("55.75"), None);
        assert_eq!(parse_position("abc,37.62"), None);
        assert_eq!(parse_position(""), None);
    }
}
