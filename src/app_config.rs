use crate::domain::{CameraParameters, CameraPosition, GeoLocation, SPEED_RANGE};
use config::{Config, ConfigError};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const GENERATED_CONFIG_FILE: &str = "config_generated.toml";

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    flight: Flight,
    camera: CameraParameters,
    map: MapSettings,
    token: TokenSettings,
    #[serde(default)]
    mapbox: Mapbox,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config: AppConfig = Config::builder()
            .add_source(config::File::with_name("config").required(true))
            .add_source(config::File::from(Path::new(GENERATED_CONFIG_FILE)).required(false))
            .add_source(config::File::with_name("config_local").required(false))
            .add_source(config::Environment::with_prefix("CAMPUS_FLIGHT").separator("__"))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !SPEED_RANGE.contains(&self.camera.speed) {
            return Err(ConfigError::Message(format!(
                "invalid camera speed: {}, must be between {} and {}",
                self.camera.speed,
                SPEED_RANGE.start(),
                SPEED_RANGE.end()
            )));
        }

        if !(self.camera.height_m > 0.0) {
            return Err(ConfigError::Message(format!("invalid camera height: {}, must be positive", self.camera.height_m)));
        }

        if self.flight.base_step_duration.is_zero() {
            return Err(ConfigError::Message("invalid flight base step duration, must not be zero".to_string()));
        }

        Ok(())
    }

    pub fn flight(&self) -> &Flight {
        &self.flight
    }

    pub fn camera(&self) -> CameraParameters {
        self.camera
    }

    pub fn map(&self) -> &MapSettings {
        &self.map
    }

    pub fn token(&self) -> &TokenSettings {
        &self.token
    }

    pub fn mapbox(&self) -> &Mapbox {
        &self.mapbox
    }
}

#[derive(Debug, Deserialize)]
pub struct Flight {
    #[serde(with = "humantime_serde")]
    base_step_duration: Duration,
    #[serde(with = "humantime_serde")]
    reset_duration: Duration,
    command_buffer_size: usize,
}

impl Flight {
    pub fn base_step_duration(&self) -> Duration {
        self.base_step_duration
    }

    pub fn reset_duration(&self) -> Duration {
        self.reset_duration
    }

    pub fn command_buffer_size(&self) -> usize {
        self.command_buffer_size
    }
}

#[derive(Debug, Deserialize)]
pub struct MapSettings {
    style: String,
    center: GeoLocation,
    zoom: f64,
    pitch: f64,
    bearing: f64,
    terrain_exaggeration: f64,
}

impl MapSettings {
    pub fn style(&self) -> &str {
        &self.style
    }

    pub fn initial_camera(&self) -> CameraPosition {
        CameraPosition {
            center: self.center,
            zoom: self.zoom,
            pitch: self.pitch,
            bearing: self.bearing,
        }
    }

    pub fn terrain_exaggeration(&self) -> f64 {
        self.terrain_exaggeration
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenSettings {
    store_path: String,
}

impl TokenSettings {
    pub fn store_path(&self) -> &str {
        &self.store_path
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Mapbox {
    access_token: Option<String>,
}

impl Mapbox {
    /// The token written by the `setup` command, if any.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|token| !token.trim().is_empty())
    }
}

#[cfg(test)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

#[cfg(test)]
impl AppConfigBuilder {
    pub fn new() -> Self {
        AppConfigBuilder {
            config: AppConfig {
                flight: Flight {
                    base_step_duration: Duration::from_millis(4000),
                    reset_duration: Duration::from_millis(2000),
                    command_buffer_size: 8,
                },
                camera: CameraParameters::default(),
                map: MapSettings {
                    style: "mapbox://styles/mapbox/satellite-streets-v12".to_string(),
                    center: GeoLocation::new(130.2163, 33.5946),
                    zoom: 15.0,
                    pitch: 60.0,
                    bearing: 0.0,
                    terrain_exaggeration: 1.5,
                },
                token: TokenSettings {
                    store_path: "token_store.json".to_string(),
                },
                mapbox: Mapbox::default(),
            },
        }
    }

    pub fn access_token(mut self, token: &str) -> Self {
        self.config.mapbox.access_token = Some(token.to_string());
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}
