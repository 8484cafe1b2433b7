//! Generation requests as they arrive from outside.
//!
//! A [`GenerationRequest`] carries raw numbers. [`GenerationRequest::validate`]
//! turns it into a [`ValidatedRequest`] that generation can run on without
//! further checks.

use mapgen_core::error::MapGenError;
use mapgen_core::map::MapSize;
use mapgen_core::spawn::{spawn_capacity, SpawnConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest accepted side length.
pub const MIN_MAP_SIDE: i64 = 10;
/// Largest accepted side length.
pub const MAX_MAP_SIDE: i64 = 1000;
/// Fewest players per map.
pub const MIN_PLAYERS: u32 = 1;
/// Most players per map.
pub const MAX_PLAYERS: u32 = mapgen_core::spawn::MAX_PLAYERS;

/// Request rejected before generation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RequestError {
    /// A side is outside the accepted range.
    #[error("Map size {x}x{y} is outside {min}..={max}")]
    SizeOutOfRange {
        /// Requested width.
        x: i64,
        /// Requested height.
        y: i64,
        /// Smallest side.
        min: i64,
        /// Largest side.
        max: i64,
    },

    /// Player count is outside the accepted range.
    #[error("Player count {requested} is outside {min}..={max}")]
    PlayersOutOfRange {
        /// Requested players.
        requested: u32,
        /// Fewest players.
        min: u32,
        /// Most players.
        max: u32,
    },

    /// Rejected by the core.
    #[error(transparent)]
    Map(#[from] MapGenError),
}

/// Requested map dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedSize {
    /// Width.
    pub x: i64,
    /// Height.
    pub y: i64,
}

/// Raw generation request.
///
/// JSON shape: `{ "size": { "x": 100, "y": 100 }, "playersCount": 2 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Map dimensions.
    pub size: RequestedSize,
    /// Number of players.
    pub players_count: u32,
}

/// Request that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedRequest {
    /// Map dimensions.
    pub size: MapSize,
    /// Number of players.
    pub players: u32,
}

impl GenerationRequest {
    /// Create a request.
    #[must_use]
    pub const fn new(x: i64, y: i64, players_count: u32) -> Self {
        Self {
            size: RequestedSize { x, y },
            players_count,
        }
    }

    /// Check ranges and that the spawn layout can seat every player.
    pub fn validate(&self, spawns: &SpawnConfig) -> Result<ValidatedRequest, RequestError> {
        let RequestedSize { x, y } = self.size;
        let side = MIN_MAP_SIDE..=MAX_MAP_SIDE;
        if !side.contains(&x) || !side.contains(&y) {
            return Err(RequestError::SizeOutOfRange {
                x,
                y,
                min: MIN_MAP_SIDE,
                max: MAX_MAP_SIDE,
            });
        }
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.players_count) {
            return Err(RequestError::PlayersOutOfRange {
                requested: self.players_count,
                min: MIN_PLAYERS,
                max: MAX_PLAYERS,
            });
        }

        let size = MapSize::try_new(x, y)?;
        let capacity = spawn_capacity(size.width(), size.height(), spawns);
        if self.players_count > capacity {
            return Err(MapGenError::PlayerCapacityExceeded {
                requested: self.players_count,
                capacity,
            }
            .into());
        }

        Ok(ValidatedRequest {
            size,
            players: self.players_count,
        })
    }
}
