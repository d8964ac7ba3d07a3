//! # Parkchase Common
//!
//! Shared types for the Parkchase workspace:
//! - ID types (EntityId, ObstacleId)
//! - Common error types
//! - Re-exported vector math

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;

pub use glam::Vec3;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use glam::Vec3;
}

pub use prelude::*;
