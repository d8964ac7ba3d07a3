//! Scene descriptions.
//!
//! A scene lists the world data the simulation is built from: obstacles,
//! spawn points and objectives. Scenes are stored as RON.

use std::fs;
use std::path::Path;

use parkchase_common::{ParkResult, SceneError, Vec3};
use parkchase_gameplay::{Adversary, Obstacle, ObstacleTransform, Simulation, SimulationConfig};
use serde::{Deserialize, Serialize};
use tracing::info;

fn unit_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

/// A box-shaped collidable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSpec {
    /// World-space center
    pub center: [f32; 3],
    /// Unscaled half-extents
    pub half_extents: [f32; 3],
    /// Per-axis scale
    #[serde(default = "unit_scale")]
    pub scale: [f32; 3],
}

impl ObstacleSpec {
    fn new(center: [f32; 3], half_extents: [f32; 3]) -> Self {
        Self {
            center,
            half_extents,
            scale: unit_scale(),
        }
    }

    fn to_obstacle(&self) -> Obstacle {
        let transform =
            ObstacleTransform::at(Vec3::from(self.center)).with_scale(Vec3::from(self.scale));
        Obstacle::new(transform, Vec3::from(self.half_extents))
    }
}

/// An adversary spawn point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdversarySpec {
    /// Spawn and patrol center
    pub position: [f32; 3],
    /// Override for the configured detection radius
    #[serde(default)]
    pub detection_radius: Option<f32>,
}

/// Everything needed to build a world.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    /// Collidable geometry
    #[serde(default)]
    pub obstacles: Vec<ObstacleSpec>,
    /// Player spawn
    #[serde(default)]
    pub player: Option<[f32; 3]>,
    /// Companion spawn
    #[serde(default)]
    pub companion: Option<[f32; 3]>,
    /// Adversary spawns
    #[serde(default)]
    pub adversaries: Vec<AdversarySpec>,
    /// Objective positions
    #[serde(default)]
    pub objectives: Vec<[f32; 3]>,
}

impl SceneDescription {
    /// Parse and validate a RON scene.
    pub fn parse(source: &str) -> Result<Self, SceneError> {
        let scene: Self = ron::from_str(source).map_err(|e| SceneError::Parse(e.to_string()))?;
        scene.validate()?;
        Ok(scene)
    }

    /// Load a scene file.
    pub fn load<P: AsRef<Path>>(path: P) -> ParkResult<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;
        let scene = Self::parse(&source)?;
        info!(
            path = %path.display(),
            obstacles = scene.obstacles.len(),
            adversaries = scene.adversaries.len(),
            objectives = scene.objectives.len(),
            "Loaded scene"
        );
        Ok(scene)
    }

    /// Check the scene for data the simulation cannot use.
    pub fn validate(&self) -> Result<(), SceneError> {
        for (index, obstacle) in self.obstacles.iter().enumerate() {
            let [x, y, z] = obstacle.half_extents;
            if obstacle.half_extents.iter().any(|e| !e.is_finite() || *e <= 0.0) {
                return Err(SceneError::InvalidObstacle { index, x, y, z });
            }
            check_finite(obstacle.center, || format!("obstacle {index}"))?;
            check_finite(obstacle.scale, || format!("obstacle {index} scale"))?;
        }

        if let Some(player) = self.player {
            check_finite(player, || "player".to_string())?;
        }
        if let Some(companion) = self.companion {
            check_finite(companion, || "companion".to_string())?;
        }
        for (index, adversary) in self.adversaries.iter().enumerate() {
            check_finite(adversary.position, || format!("adversary {index}"))?;
        }
        for (index, objective) in self.objectives.iter().enumerate() {
            check_finite(*objective, || format!("objective {index}"))?;
        }
        Ok(())
    }

    /// Build a simulation from this scene.
    #[must_use]
    pub fn build(&self, config: SimulationConfig) -> Simulation {
        let mut sim = Simulation::new(config);

        for obstacle in &self.obstacles {
            sim.register_obstacle(obstacle.to_obstacle());
        }
        if let Some(player) = self.player {
            sim.spawn_player(Vec3::from(player));
        }
        if let Some(companion) = self.companion {
            sim.spawn_companion(Vec3::from(companion));
        }
        for spec in &self.adversaries {
            let mut adversary = Adversary::new(Vec3::from(spec.position), &sim.config().adversary);
            if let Some(radius) = spec.detection_radius {
                adversary = adversary.with_detection_radius(radius);
            }
            sim.add_adversary(adversary);
        }
        for objective in &self.objectives {
            sim.place_objective(Vec3::from(*objective));
        }

        sim
    }

    /// The built-in park: a fountain, a row of benches, a few trees, three
    /// adversaries and five collectibles.
    #[must_use]
    pub fn default_park() -> Self {
        let trees = [[-12.0, 0.0, -8.0], [14.0, 0.0, -20.0], [-20.0, 0.0, 18.0], [9.0, 0.0, 22.0]]
            .into_iter()
            .map(|center| ObstacleSpec::new(center, [0.6, 3.0, 0.6]));
        let benches = (0..3)
            .map(|i| ObstacleSpec::new([-4.0 + i as f32 * 4.0, 0.0, 8.0], [1.0, 0.5, 0.4]));

        let mut obstacles = vec![ObstacleSpec {
            center: [0.0, 0.0, -15.0],
            half_extents: [1.0, 0.5, 1.0],
            scale: [3.0, 1.0, 3.0],
        }];
        obstacles.extend(trees);
        obstacles.extend(benches);

        Self {
            obstacles,
            player: Some([0.0, 0.0, 0.0]),
            companion: Some([2.0, 0.0, 2.0]),
            adversaries: vec![
                AdversarySpec {
                    position: [25.0, 0.0, -25.0],
                    detection_radius: None,
                },
                AdversarySpec {
                    position: [-25.0, 0.0, -30.0],
                    detection_radius: None,
                },
                AdversarySpec {
                    position: [0.0, 0.0, 35.0],
                    detection_radius: Some(20.0),
                },
            ],
            objectives: vec![
                [0.0, 0.0, -10.0],
                [12.0, 0.0, -4.0],
                [-15.0, 0.0, 5.0],
                [6.0, 0.0, 15.0],
                [-8.0, 0.0, -25.0],
            ],
        }
    }
}

fn check_finite(value: [f32; 3], what: impl FnOnce() -> String) -> Result<(), SceneError> {
    if value.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(SceneError::NonFinitePosition(what()))
    }
}
