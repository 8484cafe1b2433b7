//! Error types for map generation.

use thiserror::Error;

/// Result type alias using [`MapGenError`].
pub type Result<T> = std::result::Result<T, MapGenError>;

/// Top-level error type for all map generation errors.
///
/// Only structural problems surface here. Running out of placement attempts
/// or hitting a flood-fill cap is reported through result structs instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MapGenError {
    /// Map dimensions must both be positive.
    #[error("Invalid map size {x}x{y}: width and height must be positive")]
    InvalidMapSize {
        /// Requested width.
        x: i64,
        /// Requested height.
        y: i64,
    },

    /// Spawn coordinates must be non-negative.
    #[error("Invalid spawn point ({x}, {y}): coordinates must be non-negative")]
    InvalidSpawnPoint {
        /// Requested x coordinate.
        x: i64,
        /// Requested y coordinate.
        y: i64,
    },

    /// More players were requested than the spawn layout can seat.
    #[error("Requested {requested} players but the map can seat at most {capacity}")]
    PlayerCapacityExceeded {
        /// Number of players requested.
        requested: u32,
        /// Maximum supported by the layout.
        capacity: u32,
    },

    /// Generation config failed validation.
    #[error("Invalid generation config: {0}")]
    InvalidConfig(String),

    /// Config file could not be read or parsed.
    #[error("Failed to load config '{path}': {message}")]
    ConfigLoad {
        /// Path to the file that failed to load.
        path: String,
        /// Error message.
        message: String,
    },

    /// A decoded map breaks a structural invariant.
    #[error("Invalid map: {0}")]
    InvalidMap(String),

    /// Artifact encoding or decoding failed.
    #[error("Map encoding error: {0}")]
    Encoding(String),

    /// Terrain data does not match the declared map size.
    #[error("Terrain shape mismatch: expected {expected_rows} rows of {expected_cols}, got {detail}")]
    TerrainShape {
        /// Expected row count.
        expected_rows: u32,
        /// Expected column count.
        expected_cols: u32,
        /// What was found instead.
        detail: String,
    },
}
