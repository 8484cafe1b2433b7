//! # Mapgen Core
//!
//! Procedural map generation for Deepmine.
//!
//! This crate contains **only** generation logic:
//! - No rendering
//! - No IO beyond config loading
//! - No hidden randomness (every generator takes an injected RNG)
//!
//! This separation enables:
//! - Identical maps from identical seeds on every machine
//! - Headless batch generation
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`math`] - Grid points, distances, geometry helpers
//! - [`rng`] - Seeded RNG and sampling helpers
//! - [`noise`] - Hash noise and Perlin fields
//! - [`probability`] - Distance-based probability curves
//! - [`grid`] - Generic 2D grid and the guarded accessor trait
//! - [`flood_fill`] - Probabilistic cluster growth
//! - [`placement`] - Spaced object placement in annular zones
//! - [`formation`] - Linear and radial terrain formations
//! - [`terrain`] - Terrain types and the base terrain pipeline
//! - [`resources`] - Zoned and per-spawn resource deposits
//! - [`spawn`] - Player spawn layouts
//! - [`config`] - RON-loadable generation config
//! - [`map`] - The map aggregate and full pipeline

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod error;
pub mod flood_fill;
pub mod formation;
pub mod grid;
pub mod map;
pub mod math;
pub mod noise;
pub mod placement;
pub mod probability;
pub mod resources;
pub mod rng;
pub mod spawn;
pub mod terrain;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::MapGenConfig;
    pub use crate::error::{MapGenError, Result};
    pub use crate::grid::{Grid, GridAccess};
    pub use crate::map::{generate_map, GeneratedMap, GenerationReport, Map, MapId, MapSize, SessionId};
    pub use crate::math::Point;
    pub use crate::resources::{ResourceConfig, ResourceType, ZoneType};
    pub use crate::rng::{entropy_rng, seeded_rng, MapRng};
    pub use crate::spawn::{SpawnConfig, SpawnLayout, SpawnPoint, MAX_PLAYERS};
    pub use crate::terrain::{TerrainConfig, TerrainGrid, TerrainType};
}
