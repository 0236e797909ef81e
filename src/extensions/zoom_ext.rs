/// Equatorial circumference of the earth in meters, as used by web map tile math.
pub const EARTH_CIRCUMFERENCE_M: f64 = 40_075_017.0;
pub const TILE_SIZE: f64 = 512.0;
pub const MIN_ZOOM: f64 = 10.0;
pub const MAX_ZOOM: f64 = 20.0;

/// A trait to approximate map zoom levels from camera heights and vice versa.
///
/// The conversion is derived from the tile scale at the equator and ignores terrain, latitude and
/// pitch. It is a heuristic, not an elevation model.
pub trait ZoomConversions {
    /// Returns the zoom level for `self` treated as a height in meters, clamped to
    /// [`MIN_ZOOM`, `MAX_ZOOM`]. Heights that are not strictly positive map to `MAX_ZOOM`.
    fn height_to_zoom(self) -> Self;

    /// Returns the approximate camera height in meters for `self` treated as a zoom level.
    fn zoom_to_height(self) -> Self;
}

impl ZoomConversions for f64 {
    fn height_to_zoom(self) -> f64 {
        if !(self > 0.0) {
            return MAX_ZOOM;
        }

        (EARTH_CIRCUMFERENCE_M / (self * 2.0 * TILE_SIZE)).log2().clamp(MIN_ZOOM, MAX_ZOOM)
    }

    fn zoom_to_height(self) -> f64 {
        EARTH_CIRCUMFERENCE_M / (TILE_SIZE * self.exp2()) * 0.5
    }
}
