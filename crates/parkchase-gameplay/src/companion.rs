//! Companion follow controller.
//!
//! The companion has no behavior state of its own. Every tick the live
//! distance to the followed character picks a band, and the band picks the
//! speed. Nothing about the previous band is remembered.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::agent::{ground_direction, Agent};
use crate::simulation::SimulationContext;

/// Companion configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanionConfig {
    /// Distance at which the companion stops and idles
    pub follow_distance: f32,
    /// Extra distance beyond `follow_distance` before it runs to catch up
    pub catchup_margin: f32,
    /// Speed inside the follow band
    pub walk_speed: f32,
    /// Speed beyond the follow band
    pub catchup_speed: f32,
    /// Frequency of the idle glance gate (radians per second)
    pub idle_glance_frequency: f32,
    /// Gate value above which the idle companion looks at its target
    pub idle_glance_threshold: f32,
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            follow_distance: 3.0,
            catchup_margin: 5.0,
            walk_speed: 4.0,
            catchup_speed: 8.0,
            idle_glance_frequency: 0.5,
            idle_glance_threshold: 0.7,
        }
    }
}

impl CompanionConfig {
    /// Clamp values to sensible ranges.
    pub fn validate(&mut self) {
        self.follow_distance = self.follow_distance.max(0.0);
        self.catchup_margin = self.catchup_margin.max(0.0);
        self.walk_speed = self.walk_speed.max(0.0);
        self.catchup_speed = self.catchup_speed.max(self.walk_speed);
        self.idle_glance_threshold = self.idle_glance_threshold.clamp(-1.0, 1.0);
    }
}

/// Distance band the companion is in this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompanionBand {
    /// Close enough; stand still
    Idle,
    /// Walk after the target
    Follow,
    /// Run to close a large gap
    CatchUp,
}

impl CompanionBand {
    /// Pick the band for a distance.
    #[must_use]
    pub fn classify(distance: f32, config: &CompanionConfig) -> Self {
        if distance > config.follow_distance + config.catchup_margin {
            Self::CatchUp
        } else if distance > config.follow_distance {
            Self::Follow
        } else {
            Self::Idle
        }
    }

    /// Travel speed for the band.
    #[must_use]
    pub fn speed(self, config: &CompanionConfig) -> f32 {
        match self {
            Self::Idle => 0.0,
            Self::Follow => config.walk_speed,
            Self::CatchUp => config.catchup_speed,
        }
    }
}

/// Advance the companion by one tick.
///
/// A missing target leaves the companion untouched. Returns the band used
/// this tick, or `None` when there was nothing to follow.
pub fn update_companion(
    companion: &mut Agent,
    target: Option<Vec3>,
    ctx: &SimulationContext<'_>,
    config: &CompanionConfig,
) -> Option<CompanionBand> {
    let target = target?;
    let distance = companion.distance_to(target);
    let band = CompanionBand::classify(distance, config);

    match band {
        CompanionBand::Idle => {
            let gate = (ctx.clock * config.idle_glance_frequency).sin();
            if gate > config.idle_glance_threshold {
                companion.face_toward(target);
            }
        },
        CompanionBand::Follow | CompanionBand::CatchUp => {
            let direction = ground_direction(companion.position(), target);
            let desired = direction * band.speed(config) * ctx.dt;
            let allowed = companion.move_with_collision(desired, ctx.obstacles);
            if allowed != Vec3::ZERO {
                companion.face_toward(target);
            }
            trace!(
                companion = %companion.id(),
                ?band,
                distance,
                allowed = ?allowed,
                "companion moved"
            );
        },
    }

    Some(band)
}
