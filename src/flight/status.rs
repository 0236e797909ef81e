use std::fmt::{Display, Formatter};

/// The status line shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    WaitingForToken,
    WaitingForMap,
    MapLoaded,
    Flying { name: &'static str, position: usize, total: usize },
    Stopped,
    Reset,
    InvalidToken,
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::WaitingForToken => write!(f, "Waiting for an access token"),
            Status::WaitingForMap => write!(f, "Loading map..."),
            Status::MapLoaded => write!(f, "Map loaded"),
            Status::Flying { name, position, total } => write!(f, "Flying: {} ({}/{})", name, position, total),
            Status::Stopped => write!(f, "Animation stopped"),
            Status::Reset => write!(f, "Returned to initial position"),
            Status::InvalidToken => write!(f, "Error: access token is invalid"),
        }
    }
}
