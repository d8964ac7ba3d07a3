//! Line-of-sight models used by adversary perception.

use glam::Vec3;

use crate::obstacle::ObstacleRegistry;

/// Perception test between an observer and a target.
pub trait LineOfSight {
    /// Returns true if `to` is visible from `from`.
    fn has_line_of_sight(&self, from: Vec3, to: Vec3) -> bool;
}

/// Distance-only sight: anything closer than `range` is visible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeSight {
    /// Maximum visible distance
    pub range: f32,
}

impl LineOfSight for RangeSight {
    fn has_line_of_sight(&self, from: Vec3, to: Vec3) -> bool {
        from.distance(to) < self.range
    }
}

/// Range sight that is also blocked by registered obstacles.
#[derive(Debug, Clone, Copy)]
pub struct OccludedSight<'a> {
    /// Maximum visible distance
    pub range: f32,
    /// Geometry that can hide a target
    pub obstacles: &'a ObstacleRegistry,
}

impl LineOfSight for OccludedSight<'_> {
    fn has_line_of_sight(&self, from: Vec3, to: Vec3) -> bool {
        from.distance(to) < self.range && self.obstacles.first_ray_hit(from, to).is_none()
    }
}

/// Sight model picked from configuration at tick time.
#[derive(Debug, Clone, Copy)]
pub enum ConfiguredSight<'a> {
    /// Distance only
    Range(RangeSight),
    /// Distance and obstacle occlusion
    Occluded(OccludedSight<'a>),
}

impl<'a> ConfiguredSight<'a> {
    /// Select the model.
    #[must_use]
    pub fn new(range: f32, occlusion: bool, obstacles: &'a ObstacleRegistry) -> Self {
        if occlusion {
            Self::Occluded(OccludedSight { range, obstacles })
        } else {
            Self::Range(RangeSight { range })
        }
    }
}

impl LineOfSight for ConfiguredSight<'_> {
    fn has_line_of_sight(&self, from: Vec3, to: Vec3) -> bool {
        match self {
            Self::Range(sight) => sight.has_line_of_sight(from, to),
            Self::Occluded(sight) => sight.has_line_of_sight(from, to),
        }
    }
}
