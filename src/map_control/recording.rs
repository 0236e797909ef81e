use crate::domain::{EaseToOptions, FlyToOptions, GeoLocation};
use crate::map_control::MapControl;
use async_trait::async_trait;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum MapCall {
    FlyTo(FlyToOptions),
    EaseTo(EaseToOptions),
    Stop,
    SetPitch(f64),
}

/// Records every camera operation for assertions in tests.
#[derive(Debug, Default)]
pub struct RecordingMap {
    calls: Mutex<Vec<MapCall>>,
    center: GeoLocation,
    zoom: f64,
}

impl RecordingMap {
    pub fn new() -> Self {
        RecordingMap {
            calls: Mutex::new(Vec::new()),
            center: GeoLocation::new(130.2163, 33.5946),
            zoom: 15.0,
        }
    }

    pub fn calls(&self) -> Vec<MapCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fly_tos(&self) -> Vec<FlyToOptions> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MapCall::FlyTo(options) => Some(options),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: MapCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl MapControl for RecordingMap {
    async fn fly_to(&self, options: FlyToOptions) {
        self.record(MapCall::FlyTo(options));
    }

    async fn ease_to(&self, options: EaseToOptions) {
        self.record(MapCall::EaseTo(options));
    }

    async fn stop(&self) {
        self.record(MapCall::Stop);
    }

    async fn center(&self) -> GeoLocation {
        self.center
    }

    async fn zoom(&self) -> f64 {
        self.zoom
    }

    async fn set_pitch(&self, pitch: f64) {
        self.record(MapCall::SetPitch(pitch));
    }
}
