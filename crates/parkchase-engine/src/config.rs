//! Driver configuration.
//!
//! Wraps the gameplay tuning with the headless driver's own settings.
//! Loaded from TOML; a missing or broken file falls back to defaults.

use parkchase_common::{ParkError, ParkResult};
use parkchase_gameplay::{MoveIntent, SimulationConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration file name.
pub const CONFIG_FILE: &str = "parkchase.toml";

/// One stretch of scripted input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptSegment {
    /// Seconds to hold the intent
    pub duration: f32,
    /// Intent held for the whole segment
    #[serde(default)]
    pub intent: MoveIntent,
}

impl ScriptSegment {
    /// Creates a segment.
    #[must_use]
    pub const fn new(duration: f32, intent: MoveIntent) -> Self {
        Self { duration, intent }
    }
}

/// Engine configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Gameplay tuning
    pub simulation: SimulationConfig,

    // === Timing ===
    /// Seconds per simulation tick
    pub fixed_timestep: f32,
    /// Seconds per simulated presentation frame
    pub frame_delta: f32,
    /// Total simulated seconds
    pub duration_seconds: f32,

    // === World ===
    /// RON scene to load (None = built-in park)
    pub scene_path: Option<PathBuf>,

    // === Input ===
    /// Scripted intents, played in order; idle afterwards
    pub script: Vec<ScriptSegment>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let strafe = MoveIntent {
            right: true,
            run: true,
            ..MoveIntent::IDLE
        };
        let retreat = MoveIntent {
            backward: true,
            left: true,
            ..MoveIntent::IDLE
        };

        Self {
            simulation: SimulationConfig::default(),
            fixed_timestep: 1.0 / 60.0,
            frame_delta: 1.0 / 30.0,
            duration_seconds: 20.0,
            scene_path: None,
            script: vec![
                ScriptSegment::new(3.0, MoveIntent::forward()),
                ScriptSegment::new(2.0, strafe),
                ScriptSegment::new(1.0, MoveIntent::IDLE),
                ScriptSegment::new(4.0, retreat),
            ],
        }
    }
}

impl EngineConfig {
    /// Load configuration from the working directory.
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Self {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Failed to read config file: {e}");
                return Self::default();
            },
        };

        match toml::from_str::<Self>(&contents) {
            Ok(mut config) => {
                config.validate();
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("Failed to parse config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> ParkResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| ParkError::Serialization(e.to_string()))?;
        fs::write(path, contents)?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn config_path() -> PathBuf {
        PathBuf::from(CONFIG_FILE)
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        self.simulation.validate();

        // Timing
        self.fixed_timestep = self
            .fixed_timestep
            .clamp(0.001, self.simulation.session.max_tick_delta);
        self.frame_delta = self.frame_delta.clamp(0.001, 0.25);
        self.duration_seconds = self.duration_seconds.clamp(0.0, 3600.0);

        // Input
        for segment in &mut self.script {
            segment.duration = segment.duration.max(0.0);
        }
    }

    /// Total length of the input script in seconds.
    #[must_use]
    pub fn script_length(&self) -> f32 {
        self.script.iter().map(|segment| segment.duration).sum()
    }
}
