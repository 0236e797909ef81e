use crate::app_config::MapSettings;
use crate::domain::{CameraPosition, EaseToOptions, FlyToOptions, GeoLocation};
use crate::map_control::{MapControl, MapEvent};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, instrument, warn};

const TOKEN_PREFIXES: [&str; 2] = ["pk.", "sk."];

/// A map renderer without a screen. It applies every camera transition instantly, reports moves
/// through the event channel and logs what a real renderer would animate.
#[derive(Debug)]
pub struct SimulatedMap {
    camera: RwLock<CameraPosition>,
    events_tx: UnboundedSender<MapEvent>,
}

impl SimulatedMap {
    /// Creates the map and reports either `Loaded` or a token `Error` on the event channel.
    #[instrument(skip_all, fields(style = settings.style()))]
    pub async fn load(access_token: &str, settings: &MapSettings, events_tx: UnboundedSender<MapEvent>) -> Arc<Self> {
        info!("🗺️ Loading map...");
        let map = Arc::new(SimulatedMap {
            camera: RwLock::new(settings.initial_camera()),
            events_tx,
        });

        if is_well_formed_token(access_token) {
            debug!(terrain_exaggeration = settings.terrain_exaggeration(), "🗺️ Enabled terrain");
            info!("🗺️ Loading map... OK");
            map.emit(MapEvent::Loaded);
        } else {
            warn!("🗺️ Loading map... failed, the access token was rejected");
            map.emit(MapEvent::Error("Invalid access token".to_string()));
        }

        map
    }

    fn emit(&self, event: MapEvent) {
        if self.events_tx.send(event).is_err() {
            debug!("🗺️ No listener for map events");
        }
    }

    async fn moved(&self) {
        let camera = *self.camera.read().await;
        self.emit(MapEvent::Moved {
            center: camera.center,
            zoom: camera.zoom,
        });
    }
}

#[async_trait]
impl MapControl for SimulatedMap {
    async fn fly_to(&self, options: FlyToOptions) {
        info!(
            longitude = options.center.longitude,
            latitude = options.center.latitude,
            zoom = options.zoom,
            pitch = options.pitch,
            bearing = options.bearing,
            duration = ?options.duration,
            "🛩️ Flying camera"
        );

        *self.camera.write().await = CameraPosition {
            center: options.center,
            zoom: options.zoom,
            pitch: options.pitch,
            bearing: options.bearing,
        };
        self.moved().await;
    }

    async fn ease_to(&self, options: EaseToOptions) {
        debug!(zoom = options.zoom, duration = ?options.duration, "🛩️ Easing camera");

        {
            let mut camera = self.camera.write().await;
            camera.center = options.center;
            camera.zoom = options.zoom;
        }
        self.moved().await;
    }

    async fn stop(&self) {
        debug!("🛩️ Stopped camera");
    }

    async fn center(&self) -> GeoLocation {
        self.camera.read().await.center
    }

    async fn zoom(&self) -> f64 {
        self.camera.read().await.zoom
    }

    async fn set_pitch(&self, pitch: f64) {
        debug!(pitch, "🛩️ Tilting camera");
        self.camera.write().await.pitch = pitch;
        self.moved().await;
    }
}

fn is_well_formed_token(token: &str) -> bool {
    TOKEN_PREFIXES.iter().any(|prefix| token.len() > prefix.len() && token.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::AppConfigBuilder;
    use std::time::Duration;
    use test_log::test;
    use tokio::sync::mpsc;

    #[test(tokio::test)]
    async fn load_reports_loaded_for_a_well_formed_token() {
        let config = AppConfigBuilder::new().build();
        let (tx, mut rx) = mpsc::unbounded_channel();

        SimulatedMap::load("pk.valid", config.map(), tx).await;

        assert_eq!(rx.recv().await, Some(MapEvent::Loaded));
    }

    #[test(tokio::test)]
    async fn load_reports_a_token_error_for_a_malformed_token() {
        let config = AppConfigBuilder::new().build();
        let (tx, mut rx) = mpsc::unbounded_channel();

        SimulatedMap::load("nonsense", config.map(), tx).await;

        let event = rx.recv().await.unwrap();
        assert!(event.is_token_error());
    }

    #[test(tokio::test)]
    async fn fly_to_moves_the_camera_and_reports_the_move() {
        let config = AppConfigBuilder::new().build();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let map = SimulatedMap::load("pk.valid", config.map(), tx).await;
        rx.recv().await;

        let target = GeoLocation::new(130.2220, 33.5900);
        map.fly_to(FlyToOptions {
            center: target,
            zoom: 15.0,
            pitch: 45.0,
            bearing: 134.0,
            duration: Duration::from_secs(4),
            essential: true,
        })
        .await;

        assert_eq!(map.center().await, target);
        assert_eq!(map.zoom().await, 15.0);
        assert_eq!(rx.recv().await, Some(MapEvent::Moved { center: target, zoom: 15.0 }));
    }

    #[test(tokio::test)]
    async fn ease_to_keeps_pitch_and_bearing() {
        let config = AppConfigBuilder::new().build();
        let (tx, _rx) = mpsc::unbounded_channel();
        let map = SimulatedMap::load("pk.valid", config.map(), tx).await;

        map.ease_to(EaseToOptions {
            center: GeoLocation::new(130.0, 33.0),
            zoom: 12.0,
            duration: Duration::ZERO,
        })
        .await;

        let camera = *map.camera.read().await;
        assert_eq!(camera.zoom, 12.0);
        assert_eq!(camera.pitch, config.map().initial_camera().pitch);
        assert_eq!(camera.bearing, 0.0);
    }
}
