mod map_control;
#[cfg(test)]
mod recording;
mod simulated;

pub use map_control::{MapControl, MapEvent};
#[cfg(test)]
pub use recording::{MapCall, RecordingMap};
pub use simulated::SimulatedMap;
