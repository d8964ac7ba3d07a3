//! Player movement controller.
//!
//! Turns a [`MoveIntent`] into a displacement, resolves it against the
//! obstacle set and updates the player's position and facing. Collision
//! blocking degrades silently to no movement.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::agent::Agent;
use crate::input::MoveIntent;
use crate::simulation::SimulationContext;

/// Player movement configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Walk speed in units per second
    pub base_speed: f32,
    /// Speed multiplier while running
    pub run_multiplier: f32,
    /// Peak vertical bob while moving (presentation only)
    pub bob_amplitude: f32,
    /// Bob oscillation in radians per second of clock time
    pub bob_frequency: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            base_speed: 5.0,
            run_multiplier: 1.5,
            bob_amplitude: 0.05,
            bob_frequency: 10.0,
        }
    }
}

impl PlayerConfig {
    /// Speed for the given intent.
    #[must_use]
    pub fn speed_for(&self, intent: &MoveIntent) -> f32 {
        if intent.run {
            self.base_speed * self.run_multiplier
        } else {
            self.base_speed
        }
    }

    /// Clamp values to sensible ranges.
    pub fn validate(&mut self) {
        self.base_speed = self.base_speed.max(0.0);
        self.run_multiplier = self.run_multiplier.max(1.0);
        self.bob_amplitude = self.bob_amplitude.clamp(0.0, 1.0);
    }
}

/// Advance the player by one tick.
///
/// Returns the displacement actually applied.
pub fn update_player(
    player: &mut Agent,
    intent: &MoveIntent,
    ctx: &SimulationContext<'_>,
    config: &PlayerConfig,
) -> Vec3 {
    let direction = intent.direction();
    if direction == Vec3::ZERO {
        player.set_bob_offset(0.0);
        return Vec3::ZERO;
    }

    let desired = direction * config.speed_for(intent) * ctx.dt;
    let allowed = player.move_with_collision(desired, ctx.obstacles);

    // Bob is layered after resolution so it never reaches the collision test.
    if allowed == Vec3::ZERO {
        player.set_bob_offset(0.0);
    } else {
        player.set_bob_offset((ctx.clock * config.bob_frequency).sin() * config.bob_amplitude);
    }

    trace!(
        player = %player.id(),
        desired = ?desired,
        allowed = ?allowed,
        "player moved"
    );
    allowed
}
