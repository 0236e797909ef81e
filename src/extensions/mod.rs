pub mod geo_location_ext;
pub mod zoom_ext;
