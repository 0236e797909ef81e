#[derive(Clone, Copy, Default, Debug, PartialEq)]
pub struct GeoLocation {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoLocation {
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        GeoLocation { longitude, latitude }
    }
}
