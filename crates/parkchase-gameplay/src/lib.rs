//! # Parkchase Gameplay
//!
//! Agent behavior and movement resolution for Parkchase.
//!
//! This crate provides the per-frame simulation core:
//! - Obstacle registry and axis-aligned collision volumes
//! - Sliding collision resolution
//! - Player movement from per-tick intent
//! - Companion follow bands
//! - Adversary patrol/alert/chase/search AI with pack alerting
//! - Objectives, health and outcome
//! - Timed event queue and event bus
//! - The simulation tick composing all of the above

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod adversary;
pub mod agent;
pub mod collision;
pub mod companion;
pub mod events;
pub mod game_state;
pub mod input;
pub mod movement;
pub mod objective;
pub mod obstacle;
pub mod rig;
pub mod schedule;
pub mod sight;
pub mod simulation;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::adversary::*;
    pub use crate::agent::*;
    pub use crate::collision::*;
    pub use crate::companion::*;
    pub use crate::events::*;
    pub use crate::game_state::*;
    pub use crate::input::*;
    pub use crate::movement::*;
    pub use crate::objective::*;
    pub use crate::obstacle::*;
    pub use crate::rig::*;
    pub use crate::schedule::*;
    pub use crate::sight::*;
    pub use crate::simulation::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_walk_around_box() {
        let mut sim = Simulation::default();
        sim.register_obstacle(Obstacle::boxed(Vec3::new(0.0, 0.0, -10.0), Vec3::splat(5.0)));
        sim.spawn_player(Vec3::ZERO);

        for _ in 0..60 {
            sim.tick(&MoveIntent::forward(), 1.0 / 60.0);
        }
        let stopped = sim.player().map_or(Vec3::ZERO, Agent::position);
        assert!(stopped.z - HUMANOID_HALF_EXTENTS.z > -5.0);

        let sidestep = MoveIntent {
            left: true,
            forward: true,
            ..MoveIntent::IDLE
        };
        for _ in 0..240 {
            sim.tick(&sidestep, 1.0 / 60.0);
        }
        let cleared = sim.player().map_or(Vec3::ZERO, Agent::position);
        assert!(cleared.x < -5.0);
        assert!(cleared.z < stopped.z);
    }

    #[test]
    fn test_config_serde_defaults() {
        let config: SimulationConfig = serde_json::from_str(r#"{"player": {"base_speed": 7.0}}"#)
            .unwrap_or_default();
        assert_eq!(config.player.base_speed, 7.0);
        assert_eq!(config.player.run_multiplier, 1.5);
        assert_eq!(config.adversary.detection_radius, 15.0);
    }
}
