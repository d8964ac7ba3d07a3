//! Error types for Parkchase.
//!
//! The simulation core itself never fails; these cover the edges of the
//! system where world data and configuration enter.

use thiserror::Error;

/// Top-level error type for Parkchase operations.
#[derive(Debug, Error)]
pub enum ParkError {
    /// Scene description errors
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while validating world data handed to the simulation.
#[derive(Debug, Error)]
pub enum SceneError {
    /// Scene file could not be parsed
    #[error("Failed to parse scene: {0}")]
    Parse(String),

    /// Obstacle has a non-positive or non-finite extent
    #[error("Obstacle {index} has invalid half extents ({x}, {y}, {z})")]
    InvalidObstacle {
        /// Position of the obstacle in the scene list
        index: usize,
        /// X half extent
        x: f32,
        /// Y half extent
        y: f32,
        /// Z half extent
        z: f32,
    },

    /// A position in the scene is NaN or infinite
    #[error("Non-finite position for {0}")]
    NonFinitePosition(String),
}

/// Result type alias for Parkchase operations.
pub type ParkResult<T> = Result<T, ParkError>;
