use crate::domain::Waypoint;

/// The flight route around the Kyushu University Ito campus.
pub static CAMPUS_ROUTE: [Waypoint; 6] = [
    Waypoint::new(130.2100, 33.6000, 15.0, "Campus north"),
    Waypoint::new(130.2163, 33.5946, 16.0, "Campus center"),
    Waypoint::new(130.2220, 33.5900, 15.0, "Campus south"),
    Waypoint::new(130.2300, 33.5950, 14.0, "Surrounding area east"),
    Waypoint::new(130.2100, 33.5950, 14.0, "Surrounding area west"),
    Waypoint::new(130.2163, 33.5946, 16.0, "Back to the campus center"),
];
