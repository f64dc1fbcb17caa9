use crate::api::error;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A validated geographic coordinate. Construction is the only place range
/// checks happen; everything downstream can assume the values are sane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    lat: f64,
    lon: f64,
}

impl Point {
    pub fn new(lat: f64, lon: f64) -> Result<Self, error::SystemError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(error::SystemError::bad_request(
                "Latitude must be between -90 and 90 degrees",
            ));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(error::SystemError::bad_request(
                "Longitude must be between -180 and 180 degrees",
            ));
        }
        Ok(Point { lat, lon })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }
}

/// Great-circle distance in kilometers using the haversine formula. Good to
/// well under 0.5% for city-scale filtering, which is all the proximity
/// search needs.
pub fn haversine_km(a: Point, b: Point) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}
