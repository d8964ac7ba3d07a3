//! Static obstacle registry.
//!
//! This module provides the axis-aligned bounding volumes that movement is
//! resolved against. Obstacles are registered once at world-build time by the
//! scene collaborator and are read-only while a tick runs.

use glam::Vec3;
use parkchase_common::ObstacleId;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box for collision detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Creates a new AABB from its corners.
    #[must_use]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Creates an AABB from center and half-extents.
    #[must_use]
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Returns the center of the AABB.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Returns the full size of the AABB along each axis.
    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Checks if this AABB intersects another.
    ///
    /// Boxes whose faces merely touch count as intersecting.
    #[must_use]
    pub fn intersects(&self, other: &Aabb) -> bool {
        !(other.max.x < self.min.x
            || other.min.x > self.max.x
            || other.max.y < self.min.y
            || other.min.y > self.max.y
            || other.max.z < self.min.z
            || other.min.z > self.max.z)
    }

    /// Slab test of the segment `from -> to` against this box.
    ///
    /// Returns the entry fraction along the segment (0.0 to 1.0) if the
    /// segment touches the box.
    #[must_use]
    pub fn segment_hit(&self, from: Vec3, to: Vec3) -> Option<f32> {
        let delta = to - from;
        let mut t_min = 0.0_f32;
        let mut t_max = 1.0_f32;

        for axis in 0..3 {
            let origin = from[axis];
            let dir = delta[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if dir.abs() < f32::EPSILON {
                if origin < lo || origin > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / dir;
            let mut t0 = (lo - origin) * inv;
            let mut t1 = (hi - origin) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        Some(t_min)
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::ONE)
    }
}

/// Live placement of a world object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleTransform {
    /// World-space center
    pub translation: Vec3,
    /// Per-axis scale applied to the base extents
    pub scale: Vec3,
}

impl ObstacleTransform {
    /// Creates a transform at a position with unit scale.
    #[must_use]
    pub const fn at(translation: Vec3) -> Self {
        Self {
            translation,
            scale: Vec3::ONE,
        }
    }

    /// Returns the transform with a different scale.
    #[must_use]
    pub const fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }
}

impl Default for ObstacleTransform {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

/// A collidable world object.
///
/// The bounding volume is derived from the live transform every time it is
/// requested. Obstacles do not move during a session, but the world layer may
/// reposition one between ticks and the next test has to see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Placement in the world
    transform: ObstacleTransform,
    /// Half-extents before scaling
    base_half_extents: Vec3,
}

impl Obstacle {
    /// Creates an obstacle from a transform and unscaled half-extents.
    #[must_use]
    pub const fn new(transform: ObstacleTransform, base_half_extents: Vec3) -> Self {
        Self {
            transform,
            base_half_extents,
        }
    }

    /// Creates an unscaled obstacle centered at a position.
    #[must_use]
    pub const fn boxed(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(ObstacleTransform::at(center), half_extents)
    }

    /// Returns the current transform.
    #[must_use]
    pub fn transform(&self) -> ObstacleTransform {
        self.transform
    }

    /// Returns the unscaled half-extents.
    #[must_use]
    pub fn base_half_extents(&self) -> Vec3 {
        self.base_half_extents
    }

    /// Recomputes the world-space bounding volume from the transform.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(
            self.transform.translation,
            self.base_half_extents * self.transform.scale.abs(),
        )
    }
}

/// Read-only view of collidable geometry used by the resolver.
pub trait ObstacleQuery {
    /// Returns true if the volume touches any obstacle.
    fn intersects(&self, volume: &Aabb) -> bool;
}

/// Owner of every static obstacle in the scene.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObstacleRegistry {
    obstacles: Vec<Obstacle>,
}

impl ObstacleRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a collidable volume.
    pub fn register(&mut self, obstacle: Obstacle) -> ObstacleId {
        let id = ObstacleId::new(self.obstacles.len() as u32);
        self.obstacles.push(obstacle);
        id
    }

    /// Returns every registered obstacle.
    pub fn all(&self) -> impl Iterator<Item = (ObstacleId, &Obstacle)> {
        self.obstacles
            .iter()
            .enumerate()
            .map(|(i, o)| (ObstacleId::new(i as u32), o))
    }

    /// Gets an obstacle by ID.
    #[must_use]
    pub fn get(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.obstacles.get(id.index())
    }

    /// Repositions an obstacle. Only valid between ticks.
    ///
    /// Returns false if the ID is unknown.
    pub fn set_transform(&mut self, id: ObstacleId, transform: ObstacleTransform) -> bool {
        match self.obstacles.get_mut(id.index()) {
            Some(obstacle) => {
                obstacle.transform = transform;
                true
            },
            None => false,
        }
    }

    /// Returns the number of obstacles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    /// Returns true if no obstacles are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Finds the closest obstacle crossed by the segment `from -> to`.
    #[must_use]
    pub fn first_ray_hit(&self, from: Vec3, to: Vec3) -> Option<(ObstacleId, f32)> {
        self.all()
            .filter_map(|(id, o)| o.bounds().segment_hit(from, to).map(|t| (id, t)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

impl ObstacleQuery for ObstacleRegistry {
    fn intersects(&self, volume: &Aabb) -> bool {
        self.obstacles.iter().any(|o| o.bounds().intersects(volume))
    }
}

impl ObstacleQuery for [Aabb] {
    fn intersects(&self, volume: &Aabb) -> bool {
        self.iter().any(|b| b.intersects(volume))
    }
}
