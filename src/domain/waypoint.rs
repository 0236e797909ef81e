use crate::domain::GeoLocation;

/// A fixed point on the flight route with the zoom level the camera should at least reach there.
#[derive(Clone, Debug, PartialEq)]
pub struct Waypoint {
    pub location: GeoLocation,
    pub zoom: f64,
    pub name: &'static str,
}

impl Waypoint {
    pub const fn new(longitude: f64, latitude: f64, zoom: f64, name: &'static str) -> Self {
        Waypoint {
            location: GeoLocation::new(longitude, latitude),
            zoom,
            name,
        }
    }
}
