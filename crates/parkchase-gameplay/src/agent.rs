//! Shared agent representation.
//!
//! Player, companion and adversaries all carry the same kinematic core: a
//! collision-tested position, a facing derived from the last real movement,
//! and presentation-only extras (bob offset, gait phase) that never feed back
//! into collision tests.

use glam::Vec3;
use parkchase_common::EntityId;
use serde::{Deserialize, Serialize};

use crate::collision;
use crate::obstacle::ObstacleQuery;
use crate::rig::{LimbPose, Rig};

/// Half-size of the collision box used for humanoid agents.
pub const HUMANOID_HALF_EXTENTS: Vec3 = Vec3::new(0.5, 1.8, 0.5);

/// Gait phase advance per world unit travelled.
const STRIDE_FREQUENCY: f32 = 2.5;

/// Kind of agent, used by renderers to pick a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    /// Player-controlled character
    Player,
    /// Autonomous follower
    Companion,
    /// Pursuing adversary
    Adversary,
}

/// A moving character in the simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    id: EntityId,
    kind: AgentKind,
    /// Collision-tested position (box center)
    position: Vec3,
    /// Heading around +Y, 0 = facing +Z
    facing_yaw: f32,
    half_extents: Vec3,
    /// Displacement over the last tick divided by its duration
    velocity: Vec3,
    /// Vertical presentation offset layered on top of `position`
    bob_offset: f32,
    gait_phase: f32,
    rig: Rig,
}

impl Agent {
    /// Create a humanoid agent at the given position.
    #[must_use]
    pub fn new(kind: AgentKind, position: Vec3) -> Self {
        Self {
            id: EntityId::new(),
            kind,
            position,
            facing_yaw: 0.0,
            half_extents: HUMANOID_HALF_EXTENTS,
            velocity: Vec3::ZERO,
            bob_offset: 0.0,
            gait_phase: 0.0,
            rig: Rig::default(),
        }
    }

    /// Attach the body-part handles captured when the model was built.
    pub fn set_rig(&mut self, rig: Rig) {
        self.rig = rig;
    }

    /// Put the agent at `position` at rest, keeping its facing.
    pub fn respawn(&mut self, position: Vec3) {
        self.position = position;
        self.velocity = Vec3::ZERO;
        self.bob_offset = 0.0;
        self.gait_phase = 0.0;
    }

    /// Get the agent's entity ID.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Get the agent kind.
    #[must_use]
    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    /// Get the collision-tested position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Position to draw the model at, bob included.
    #[must_use]
    pub fn render_position(&self) -> Vec3 {
        self.position + Vec3::Y * self.bob_offset
    }

    /// Get the facing yaw in radians.
    #[must_use]
    pub fn facing_yaw(&self) -> f32 {
        self.facing_yaw
    }

    /// Unit vector the agent is facing along.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        Vec3::new(self.facing_yaw.sin(), 0.0, self.facing_yaw.cos())
    }

    /// Turn to look at a point. Points straight above or below are ignored.
    pub fn face_toward(&mut self, point: Vec3) {
        let dx = point.x - self.position.x;
        let dz = point.z - self.position.z;
        if dx != 0.0 || dz != 0.0 {
            self.facing_yaw = dx.atan2(dz);
        }
    }

    /// Get the collision half-extents.
    #[must_use]
    pub fn half_extents(&self) -> Vec3 {
        self.half_extents
    }

    /// Get the velocity measured over the last tick.
    #[must_use]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Store the velocity implied by moving from `previous` to the current position.
    pub fn record_velocity(&mut self, previous: Vec3, dt: f32) {
        self.velocity = if dt > 0.0 {
            (self.position - previous) / dt
        } else {
            Vec3::ZERO
        };
    }

    /// Get the presentation bob offset.
    #[must_use]
    pub fn bob_offset(&self) -> f32 {
        self.bob_offset
    }

    /// Set the presentation bob offset.
    pub fn set_bob_offset(&mut self, offset: f32) {
        self.bob_offset = offset;
    }

    /// Get the attached rig.
    #[must_use]
    pub fn rig(&self) -> &Rig {
        &self.rig
    }

    /// Current limb swing for the renderer.
    #[must_use]
    pub fn limb_pose(&self) -> Vec<LimbPose> {
        let moving = self.velocity.length_squared() > f32::EPSILON;
        self.rig.walk_pose(self.gait_phase, moving)
    }

    /// Distance from the agent to a point.
    #[must_use]
    pub fn distance_to(&self, point: Vec3) -> f32 {
        self.position.distance(point)
    }

    /// Move without any collision test.
    pub fn translate(&mut self, displacement: Vec3) {
        self.position += displacement;
        self.gait_phase += displacement.length() * STRIDE_FREQUENCY;
    }

    /// Resolve a displacement against obstacles and apply what is allowed.
    ///
    /// When the agent actually moves it turns toward the point it moved to.
    /// Returns the applied displacement.
    pub fn move_with_collision<Q: ObstacleQuery + ?Sized>(
        &mut self,
        displacement: Vec3,
        obstacles: &Q,
    ) -> Vec3 {
        let allowed =
            collision::resolve(self.position, self.half_extents, displacement, obstacles);
        if allowed != Vec3::ZERO {
            self.face_toward(self.position + allowed);
            self.translate(allowed);
        }
        allowed
    }
}

/// Unit vector from `from` toward `to` in the ground plane.
///
/// Returns zero when the points share X and Z.
#[must_use]
pub fn ground_direction(from: Vec3, to: Vec3) -> Vec3 {
    Vec3::new(to.x - from.x, 0.0, to.z - from.z).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obstacle::{Obstacle, ObstacleRegistry};
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_agent_creation() {
        let agent = Agent::new(AgentKind::Player, Vec3::new(1.0, 0.0, 2.0));
        assert_ne!(agent.id(), EntityId::NULL);
        assert_eq!(agent.kind(), AgentKind::Player);
        assert_eq!(agent.half_extents(), HUMANOID_HALF_EXTENTS);
        assert_eq!(agent.velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_face_toward() {
        let mut agent = Agent::new(AgentKind::Player, Vec3::ZERO);
        agent.face_toward(Vec3::new(5.0, 0.0, 0.0));
        assert!((agent.facing_yaw() - FRAC_PI_2).abs() < 1e-6);
        assert!((agent.forward() - Vec3::X).length() < 1e-6);

        // Straight up: facing unchanged.
        agent.face_toward(Vec3::new(0.0, 5.0, 0.0));
        assert!((agent.facing_yaw() - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_render_position_includes_bob() {
        let mut agent = Agent::new(AgentKind::Player, Vec3::ZERO);
        agent.set_bob_offset(0.1);
        assert_eq!(agent.position(), Vec3::ZERO);
        assert_eq!(agent.render_position(), Vec3::new(0.0, 0.1, 0.0));
    }

    #[test]
    fn test_record_velocity() {
        let mut agent = Agent::new(AgentKind::Companion, Vec3::new(2.0, 0.0, 0.0));
        agent.record_velocity(Vec3::ZERO, 0.5);
        assert_eq!(agent.velocity(), Vec3::new(4.0, 0.0, 0.0));

        agent.record_velocity(Vec3::ZERO, 0.0);
        assert_eq!(agent.velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_move_with_collision_blocked_keeps_facing() {
        let mut registry = ObstacleRegistry::new();
        registry.register(Obstacle::boxed(Vec3::new(0.0, 0.0, 2.0), Vec3::ONE));

        let mut agent = Agent::new(AgentKind::Player, Vec3::ZERO);
        agent.face_toward(Vec3::new(-1.0, 0.0, 0.0));
        let yaw = agent.facing_yaw();

        let moved = agent.move_with_collision(Vec3::new(0.0, 0.0, 1.0), &registry);
        assert_eq!(moved, Vec3::ZERO);
        assert_eq!(agent.position(), Vec3::ZERO);
        assert_eq!(agent.facing_yaw(), yaw);
    }

    #[test]
    fn test_move_with_collision_faces_motion() {
        let registry = ObstacleRegistry::new();
        let mut agent = Agent::new(AgentKind::Player, Vec3::ZERO);

        let moved = agent.move_with_collision(Vec3::new(0.0, 0.0, -1.0), &registry);
        assert_eq!(moved, Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(agent.position(), Vec3::new(0.0, 0.0, -1.0));
        assert!((agent.forward() - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn test_ground_direction() {
        let dir = ground_direction(Vec3::ZERO, Vec3::new(3.0, 10.0, 4.0));
        assert!((dir - Vec3::new(0.6, 0.0, 0.8)).length() < 1e-6);
        assert_eq!(ground_direction(Vec3::ZERO, Vec3::Y), Vec3::ZERO);
    }
}
