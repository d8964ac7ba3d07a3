//! Collectible objectives.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A collectible placed in the world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    /// World position
    pub position: Vec3,
    /// Whether it has been picked up
    pub collected: bool,
}

/// All objectives in a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectiveSet {
    items: Vec<Objective>,
}

impl ObjectiveSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Place an objective. Returns its index.
    pub fn place(&mut self, position: Vec3) -> usize {
        self.items.push(Objective {
            position,
            collected: false,
        });
        self.items.len() - 1
    }

    /// Collect every uncollected objective within `radius` of `point`.
    ///
    /// Returns the indices collected by this call.
    pub fn collect_near(&mut self, point: Vec3, radius: f32) -> Vec<usize> {
        self.items
            .iter_mut()
            .enumerate()
            .filter(|(_, item)| !item.collected && item.position.distance(point) <= radius)
            .map(|(index, item)| {
                item.collected = true;
                index
            })
            .collect()
    }

    /// Number collected.
    #[must_use]
    pub fn collected_count(&self) -> usize {
        self.items.iter().filter(|item| item.collected).count()
    }

    /// Number placed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.items.len()
    }

    /// True when at least one objective exists and all are collected.
    #[must_use]
    pub fn all_collected(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(|item| item.collected)
    }

    /// Iterate objectives.
    pub fn iter(&self) -> impl Iterator<Item = &Objective> {
        self.items.iter()
    }

    /// Mark every objective uncollected.
    pub fn reset(&mut self) {
        for item in &mut self.items {
            item.collected = false;
        }
    }
}
