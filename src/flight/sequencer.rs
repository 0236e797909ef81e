use crate::app_config::AppConfig;
use crate::domain::{CameraParameters, CameraPosition, EaseToOptions, FlyToOptions, SPEED_RANGE, Waypoint};
use crate::extensions::geo_location_ext::InitialBearing;
use crate::extensions::zoom_ext::ZoomConversions;
use crate::flight::Status;
use crate::map_control::MapControl;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::Receiver;
use tokio::sync::watch::Sender as WatchSender;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, instrument, warn};

#[derive(Debug)]
pub enum SequencerCommand {
    AttachMap(Arc<dyn MapControl>),
    Start,
    Stop,
    Reset,
    SetSpeed(f64),
    SetHeight(f64),
    SetPitch(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlightState {
    Idle,
    Flying { next_step_at: Instant },
    Stopped,
}

/// Flies the camera along a route, one waypoint per step, until stopped.
///
/// The sequencer owns all flight state. It is driven either directly through its methods or as an
/// actor through [`FlightSequencer::run`], where the single pending step is a deadline raced
/// against incoming commands.
#[derive(Debug)]
pub struct FlightSequencer {
    route: &'static [Waypoint],
    map: Option<Arc<dyn MapControl>>,
    camera: CameraParameters,
    default_camera: CameraParameters,
    initial_position: CameraPosition,
    base_step_duration: Duration,
    reset_duration: Duration,
    state: FlightState,
    index: usize,
    status_tx: WatchSender<Status>,
}

impl FlightSequencer {
    pub fn new(route: &'static [Waypoint], config: &AppConfig, status_tx: WatchSender<Status>) -> Self {
        FlightSequencer {
            route,
            map: None,
            camera: config.camera(),
            default_camera: config.camera(),
            initial_position: config.map().initial_camera(),
            base_step_duration: config.flight().base_step_duration(),
            reset_duration: config.flight().reset_duration(),
            state: FlightState::Idle,
            index: 0,
            status_tx,
        }
    }

    pub fn state(&self) -> FlightState {
        self.state
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn camera(&self) -> CameraParameters {
        self.camera
    }

    pub fn is_flying(&self) -> bool {
        matches!(self.state, FlightState::Flying { .. })
    }

    pub fn next_step_at(&self) -> Option<Instant> {
        match self.state {
            FlightState::Flying { next_step_at } => Some(next_step_at),
            _ => None,
        }
    }

    #[instrument(skip_all)]
    pub async fn run(mut self, mut rx: Receiver<SequencerCommand>) {
        loop {
            let next_step_at = self.next_step_at();
            tokio::select! {
                command = rx.recv() => match command {
                    Some(command) => self.handle(command).await,
                    None => break,
                },
                _ = wait_until(next_step_at) => self.step().await,
            }
        }

        debug!("🛩️ Command channel closed, stopping the sequencer");
    }

    async fn handle(&mut self, command: SequencerCommand) {
        debug!(?command, "🛩️ Received command");
        match command {
            SequencerCommand::AttachMap(map) => self.attach_map(map).await,
            SequencerCommand::Start => self.start().await,
            SequencerCommand::Stop => self.stop().await,
            SequencerCommand::Reset => self.reset().await,
            SequencerCommand::SetSpeed(speed) => self.set_speed(speed),
            SequencerCommand::SetHeight(height) => self.set_height(height).await,
            SequencerCommand::SetPitch(pitch) => self.set_pitch(pitch).await,
        }
    }

    /// Makes the map available to the sequencer and moves the camera to the configured height.
    pub async fn attach_map(&mut self, map: Arc<dyn MapControl>) {
        self.map = Some(map);
        self.apply_height().await;
        self.status_tx.send_replace(Status::MapLoaded);
        info!("🛩️ Attached map");
    }

    #[instrument(skip(self))]
    pub async fn start(&mut self) {
        if self.map.is_none() {
            debug!("🛩️ Ignoring start, the map is not loaded yet");
            return;
        }

        if self.is_flying() {
            debug!("🛩️ Ignoring start, already flying");
            return;
        }

        info!(waypoints = self.route.len(), "🛩️ Starting flight");
        self.index = 0;
        self.state = FlightState::Flying { next_step_at: Instant::now() };
        self.step().await;
    }

    /// Flies to the waypoint at the current index and schedules the next step.
    #[instrument(skip(self), fields(index = self.index))]
    pub async fn step(&mut self) {
        if !self.is_flying() {
            return;
        }

        let Some(map) = self.map.clone() else {
            return;
        };

        if self.index >= self.route.len() {
            self.index = 0;
        }

        let Some(waypoint) = self.route.get(self.index) else {
            warn!("⚠️ Route has no waypoints, stopping flight");
            self.state = FlightState::Stopped;
            return;
        };

        let zoom = waypoint.zoom.max(self.camera.height_m.height_to_zoom());
        let bearing = bearing_at(self.route, self.index);
        let duration = self.step_duration();

        self.status_tx.send_replace(Status::Flying {
            name: waypoint.name,
            position: self.index + 1,
            total: self.route.len(),
        });
        info!(bearing, zoom, duration = ?duration, "🛩️ Flying to '{}' ({}/{})", waypoint.name, self.index + 1, self.route.len());

        map.fly_to(FlyToOptions {
            center: waypoint.location,
            zoom,
            pitch: self.camera.pitch_deg,
            bearing,
            duration,
            essential: true,
        })
        .await;

        self.index += 1;
        let now = Instant::now();
        self.state = FlightState::Flying {
            next_step_at: now.checked_add(duration).unwrap_or(now + self.base_step_duration),
        };
    }

    /// Cancels the pending step and halts the camera.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) {
        self.state = FlightState::Stopped;
        self.status_tx.send_replace(Status::Stopped);
        info!("🛑 Stopped flight");

        if let Some(map) = &self.map {
            map.stop().await;
        }
    }

    /// Stops the flight, returns the camera to its initial position and restores the default camera parameters.
    #[instrument(skip(self))]
    pub async fn reset(&mut self) {
        self.stop().await;

        let Some(map) = &self.map else {
            return;
        };

        let position = self.initial_position;
        map.fly_to(FlyToOptions {
            center: position.center,
            zoom: position.zoom,
            pitch: position.pitch,
            bearing: position.bearing,
            duration: self.reset_duration,
            essential: false,
        })
        .await;

        self.camera = self.default_camera;
        self.status_tx.send_replace(Status::Reset);
        info!("🏠 Returned to initial position");
    }

    /// Speed changes take effect at the next step.
    pub fn set_speed(&mut self, speed: f64) {
        if !SPEED_RANGE.contains(&speed) {
            warn!("⚠️ Ignoring speed {}, must be between {} and {}", speed, SPEED_RANGE.start(), SPEED_RANGE.end());
            return;
        }

        self.camera.speed = speed;
        debug!(speed, "🎚️ Updated speed");
    }

    pub async fn set_height(&mut self, height_m: f64) {
        if !(height_m > 0.0) {
            warn!("⚠️ Ignoring invalid height {}", height_m);
            return;
        }

        self.camera.height_m = height_m;
        debug!(height_m, "🎚️ Updated height");
        if !self.is_flying() {
            self.apply_height().await;
        }
    }

    pub async fn set_pitch(&mut self, pitch_deg: f64) {
        self.camera.pitch_deg = pitch_deg;
        debug!(pitch_deg, "🎚️ Updated pitch");

        if self.is_flying() {
            return;
        }

        if let Some(map) = &self.map {
            map.set_pitch(pitch_deg).await;
        }
    }

    async fn apply_height(&self) {
        let Some(map) = &self.map else {
            return;
        };

        let center = map.center().await;
        map.ease_to(EaseToOptions {
            center,
            zoom: self.camera.height_m.height_to_zoom(),
            duration: Duration::ZERO,
        })
        .await;
    }

    fn step_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.base_step_duration.as_secs_f64() / self.camera.speed).unwrap_or(self.base_step_duration)
    }
}

/// Returns the heading from the previous waypoint towards the waypoint at `index`. The first
/// waypoint, and any index past the end of the route, has a bearing of 0.
pub fn bearing_at(route: &[Waypoint], index: usize) -> f64 {
    if index == 0 || index >= route.len() {
        return 0.0;
    }

    route[index - 1].location.initial_bearing_to(&route[index].location)
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
