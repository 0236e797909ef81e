use crate::domain::{EaseToOptions, FlyToOptions, GeoLocation};
use async_trait::async_trait;
use std::fmt::Debug;

/// The narrow set of camera operations the flight sequencer needs from a map renderer.
#[async_trait]
pub trait MapControl: Debug + Send + Sync {
    async fn fly_to(&self, options: FlyToOptions);

    async fn ease_to(&self, options: EaseToOptions);

    /// Stops any camera transition in progress. Calling it while idle has no effect.
    async fn stop(&self);

    async fn center(&self) -> GeoLocation;

    async fn zoom(&self) -> f64;

    async fn set_pitch(&self, pitch: f64);
}

/// Notifications emitted by a map renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    Loaded,
    Moved { center: GeoLocation, zoom: f64 },
    Error(String),
}

impl MapEvent {
    pub fn is_token_error(&self) -> bool {
        matches!(self, MapEvent::Error(message) if message.to_lowercase().contains("token"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(MapEvent::Error("Invalid access token".to_string()), true)]
    #[case(MapEvent::Error("style not found".to_string()), false)]
    #[case(MapEvent::Loaded, false)]
    fn is_token_error(#[case] event: MapEvent, #[case] expected: bool) {
        assert_eq!(event.is_token_error(), expected);
    }
}
