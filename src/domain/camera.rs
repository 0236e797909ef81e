use crate::domain::GeoLocation;
use serde::Deserialize;
use std::ops::RangeInclusive;
use std::time::Duration;

/// Accepted speed multipliers, the range of the speed slider.
pub const SPEED_RANGE: RangeInclusive<f64> = 0.1..=10.0;

/// User controlled camera settings, passed through to every fly-to command.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct CameraParameters {
    pub speed: f64,
    pub height_m: f64,
    pub pitch_deg: f64,
}

impl Default for CameraParameters {
    fn default() -> Self {
        CameraParameters {
            speed: 1.0,
            height_m: 2000.0,
            pitch_deg: 60.0,
        }
    }
}

/// Where the camera starts after the map has loaded, and where `reset` returns to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPosition {
    pub center: GeoLocation,
    pub zoom: f64,
    pub pitch: f64,
    pub bearing: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlyToOptions {
    pub center: GeoLocation,
    pub zoom: f64,
    pub pitch: f64,
    pub bearing: f64,
    pub duration: Duration,
    /// Essential transitions are not skipped when the user prefers reduced motion.
    pub essential: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EaseToOptions {
    pub center: GeoLocation,
    pub zoom: f64,
    pub duration: Duration,
}
