//! Collision resolution for agent movement.
//!
//! Movement is resolved with a greedy axis-decomposed slide: the full
//! displacement is tried first, then the X component alone, then the Z
//! component alone. If all three collide the agent stays put for the tick.
//! There is no swept test and no partial clipping along the blocked axis.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::obstacle::{Aabb, ObstacleQuery};

/// Which attempt of the slide produced the allowed displacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlideOutcome {
    /// Full displacement accepted
    Full,
    /// Only the X component was accepted
    XOnly,
    /// Only the Z component was accepted
    ZOnly,
    /// Nothing could be accepted
    Blocked,
}

impl SlideOutcome {
    /// Returns true if the full displacement could not be applied.
    #[must_use]
    pub fn collided(self) -> bool {
        !matches!(self, Self::Full)
    }
}

/// Result of resolving one displacement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// Displacement the agent may apply this tick
    pub allowed: Vec3,
    /// Attempt that succeeded
    pub outcome: SlideOutcome,
}

impl Resolution {
    const fn new(allowed: Vec3, outcome: SlideOutcome) -> Self {
        Self { allowed, outcome }
    }
}

/// Returns the largest displacement the agent may apply.
pub fn resolve<Q: ObstacleQuery + ?Sized>(
    position: Vec3,
    half_extents: Vec3,
    displacement: Vec3,
    obstacles: &Q,
) -> Vec3 {
    resolve_detailed(position, half_extents, displacement, obstacles).allowed
}

/// Resolves a displacement and reports which attempt succeeded.
pub fn resolve_detailed<Q: ObstacleQuery + ?Sized>(
    position: Vec3,
    half_extents: Vec3,
    displacement: Vec3,
    obstacles: &Q,
) -> Resolution {
    let attempts = [
        (displacement, SlideOutcome::Full),
        (Vec3::new(displacement.x, 0.0, 0.0), SlideOutcome::XOnly),
        (Vec3::new(0.0, 0.0, displacement.z), SlideOutcome::ZOnly),
    ];

    for (candidate, outcome) in attempts {
        if is_position_clear(position + candidate, half_extents, obstacles) {
            return Resolution::new(candidate, outcome);
        }
    }

    Resolution::new(Vec3::ZERO, SlideOutcome::Blocked)
}

/// Check if a box at `position` touches no obstacle.
pub fn is_position_clear<Q: ObstacleQuery + ?Sized>(
    position: Vec3,
    half_extents: Vec3,
    obstacles: &Q,
) -> bool {
    !obstacles.intersects(&Aabb::from_center(position, half_extents))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::HUMANOID_HALF_EXTENTS;
    use crate::obstacle::{Obstacle, ObstacleRegistry};
    use proptest::prelude::*;

    fn box_ahead() -> ObstacleRegistry {
        let mut registry = ObstacleRegistry::new();
        registry.register(Obstacle::boxed(Vec3::new(0.0, 0.0, 10.0), Vec3::splat(5.0)));
        registry
    }

    #[test]
    fn test_empty_registry_accepts_everything() {
        let registry = ObstacleRegistry::new();
        let d = Vec3::new(3.0, -1.0, 7.5);
        let result = resolve_detailed(Vec3::ZERO, HUMANOID_HALF_EXTENTS, d, &registry);
        assert_eq!(result.allowed, d);
        assert_eq!(result.outcome, SlideOutcome::Full);
        assert!(!result.outcome.collided());
    }

    #[test]
    fn test_x_only_fallback_against_wall() {
        // Wall across the path in -Z, wide in X.
        let walls = [Aabb::new(
            Vec3::new(-50.0, -5.0, -3.0),
            Vec3::new(50.0, 5.0, -2.0),
        )];
        let d = Vec3::new(1.0, 0.0, -1.5);

        let result = resolve_detailed(Vec3::ZERO, HUMANOID_HALF_EXTENTS, d, &walls[..]);
        assert_eq!(result.outcome, SlideOutcome::XOnly);
        assert_eq!(result.allowed, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_z_only_fallback_when_x_blocked() {
        // Wall to the right, long in Z.
        let walls = [Aabb::new(
            Vec3::new(1.0, -5.0, -50.0),
            Vec3::new(2.0, 5.0, 50.0),
        )];
        let d = Vec3::new(1.0, 0.0, 2.0);

        let result = resolve_detailed(Vec3::ZERO, HUMANOID_HALF_EXTENTS, d, &walls[..]);
        assert_eq!(result.outcome, SlideOutcome::ZOnly);
        assert_eq!(result.allowed, Vec3::new(0.0, 0.0, 2.0));
    }

    #[test]
    fn test_blocked_in_corner() {
        let walls = [
            Aabb::new(Vec3::new(-50.0, -5.0, 1.0), Vec3::new(50.0, 5.0, 2.0)),
            Aabb::new(Vec3::new(1.0, -5.0, -50.0), Vec3::new(2.0, 5.0, 50.0)),
        ];
        let d = Vec3::new(1.0, 0.0, 1.0);

        let result = resolve_detailed(Vec3::ZERO, HUMANOID_HALF_EXTENTS, d, &walls[..]);
        assert_eq!(result.outcome, SlideOutcome::Blocked);
        assert_eq!(result.allowed, Vec3::ZERO);
    }

    #[test]
    fn test_y_component_dropped_on_slide() {
        let walls = [Aabb::new(
            Vec3::new(-50.0, -5.0, 1.0),
            Vec3::new(50.0, 5.0, 2.0),
        )];
        let d = Vec3::new(0.5, 0.25, 1.0);
        let allowed = resolve(Vec3::ZERO, HUMANOID_HALF_EXTENTS, d, &walls[..]);
        assert_eq!(allowed, Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn test_box_avoidance_single_large_step() {
        let registry = box_ahead();
        let mut position = Vec3::ZERO;

        for _ in 0..10 {
            position += resolve(
                position,
                HUMANOID_HALF_EXTENTS,
                Vec3::new(0.0, 0.0, 5.0),
                &registry,
            );
        }

        assert_eq!(position, Vec3::ZERO);
    }

    #[test]
    fn test_box_avoidance_approach_stops_short() {
        let registry = box_ahead();
        for step in [1.0, 0.5] {
            let mut position = Vec3::ZERO;
            for _ in 0..100 {
                position += resolve(
                    position,
                    HUMANOID_HALF_EXTENTS,
                    Vec3::new(0.0, 0.0, step),
                    &registry,
                );
            }
            assert!(
                position.z <= 4.5 - HUMANOID_HALF_EXTENTS.z,
                "step {step} reached {}",
                position.z
            );
        }

        // Finer steps creep closer but the front face never reaches the box.
        for step in [0.25, 0.3] {
            let mut position = Vec3::ZERO;
            for _ in 0..100 {
                position += resolve(
                    position,
                    HUMANOID_HALF_EXTENTS,
                    Vec3::new(0.0, 0.0, step),
                    &registry,
                );
            }
            assert!(position.z + HUMANOID_HALF_EXTENTS.z < 5.0);
            assert!(position.z > 3.5);
        }
    }

    #[test]
    fn test_is_position_clear() {
        let registry = box_ahead();
        assert!(is_position_clear(Vec3::ZERO, HUMANOID_HALF_EXTENTS, &registry));
        assert!(!is_position_clear(Vec3::new(0.0, 0.0, 10.0), HUMANOID_HALF_EXTENTS, &registry));
    }

    proptest! {
        #[test]
        fn prop_resolved_box_never_enters_obstacle(
            center in prop::array::uniform3(-10.0f32..10.0),
            half in prop::array::uniform3(0.5f32..5.0),
            start in prop::array::uniform3(-15.0f32..15.0),
            delta in prop::array::uniform3(-6.0f32..6.0),
        ) {
            let obstacle = Aabb::from_center(Vec3::from(center), Vec3::from(half));
            let start = Vec3::from(start);
            prop_assume!(!obstacle.intersects(&Aabb::from_center(start, HUMANOID_HALF_EXTENTS)));

            let walls = [obstacle];
            let allowed = resolve(start, HUMANOID_HALF_EXTENTS, Vec3::from(delta), &walls[..]);
            let end_box = Aabb::from_center(start + allowed, HUMANOID_HALF_EXTENTS);
            prop_assert!(!obstacle.intersects(&end_box));
        }
    }
}
