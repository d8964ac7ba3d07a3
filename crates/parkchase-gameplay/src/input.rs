//! Per-tick movement intent.
//!
//! Keyboard and touch mapping live outside the simulation; whatever drives it
//! hands over one [`MoveIntent`] snapshot per tick.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Movement intent for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveIntent {
    /// Move toward -Z
    pub forward: bool,
    /// Move toward +Z
    pub backward: bool,
    /// Move toward -X
    pub left: bool,
    /// Move toward +X
    pub right: bool,
    /// Run modifier
    pub run: bool,
}

impl MoveIntent {
    /// No movement requested.
    pub const IDLE: Self = Self {
        forward: false,
        backward: false,
        left: false,
        right: false,
        run: false,
    };

    /// Intent moving forward only.
    #[must_use]
    pub const fn forward() -> Self {
        Self {
            forward: true,
            ..Self::IDLE
        }
    }

    /// Returns the intent with the run modifier set.
    #[must_use]
    pub const fn running(mut self) -> Self {
        self.run = true;
        self
    }

    /// Returns true if any direction is held.
    #[must_use]
    pub const fn has_direction(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }

    /// Unnormalized sum of the held directions.
    #[must_use]
    pub fn raw_axis(&self) -> Vec3 {
        let mut axis = Vec3::ZERO;
        if self.forward {
            axis.z -= 1.0;
        }
        if self.backward {
            axis.z += 1.0;
        }
        if self.left {
            axis.x -= 1.0;
        }
        if self.right {
            axis.x += 1.0;
        }
        axis
    }

    /// Unit direction of travel, zero when nothing is held or inputs cancel.
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        self.raw_axis().normalize_or_zero()
    }
}
