use crate::domain::GeoLocation;

/// A trait to compute the compass heading from one location towards another.
pub trait InitialBearing {
    /// Returns the initial great-circle bearing from `self` towards `destination` in degrees,
    /// normalized to [0, 360).
    /// See https://www.movable-type.co.uk/scripts/latlong.html.
    fn initial_bearing_to(&self, destination: &GeoLocation) -> f64;
}

impl InitialBearing for GeoLocation {
    fn initial_bearing_to(&self, destination: &GeoLocation) -> f64 {
        let delta_longitude = (destination.longitude - self.longitude).to_radians();
        let latitude1 = self.latitude.to_radians();
        let latitude2 = destination.latitude.to_radians();

        let y = delta_longitude.sin() * latitude2.cos();
        let x = latitude1.cos() * latitude2.sin() - latitude1.sin() * latitude2.cos() * delta_longitude.cos();

        // rem_euclid keeps -0.0 and tiny negative angles inside [0, 360)
        let bearing = y.atan2(x).to_degrees().rem_euclid(360.0);
        if bearing >= 360.0 { 0.0 } else { bearing }
    }
}
