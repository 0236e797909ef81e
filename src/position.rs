use crate::domain::GeoLocation;
use crate::extensions::zoom_ext::ZoomConversions;
use std::fmt::{Display, Formatter};

/// The camera position read-out, with a height approximated from the zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionInfo {
    center: GeoLocation,
    zoom: f64,
}

impl PositionInfo {
    pub fn new(center: GeoLocation, zoom: f64) -> Self {
        PositionInfo { center, zoom }
    }

    pub fn approximate_height_m(&self) -> u64 {
        self.zoom.zoom_to_height().round() as u64
    }
}

impl Display for PositionInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "lat: {:.4}, lng: {:.4}, height: {}m",
            self.center.latitude,
            self.center.longitude,
            self.approximate_height_m()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_the_position_with_four_decimals() {
        let info = PositionInfo::new(GeoLocation::new(130.21634, 33.59462), 10.0);

        assert_eq!(info.to_string(), "lat: 33.5946, lng: 130.2163, height: 38m");
    }
}
