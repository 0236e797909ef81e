mod camera;
mod geo_location;
mod route;
mod waypoint;

pub use camera::{CameraParameters, CameraPosition, EaseToOptions, FlyToOptions, SPEED_RANGE};
pub use geo_location::GeoLocation;
pub use route::CAMPUS_ROUTE;
pub use waypoint::Waypoint;
