//! The map aggregate and the generation pipeline that fills it.
//!
//! A [`Map`] owns its terrain grid and spawn points. [`generate_map`] runs
//! the full pipeline in a fixed order:
//!
//! 1. spawn points
//! 2. base terrain (layers, bedrock outcrops, rock veins)
//! 3. spawn accessibility
//! 4. zoned resource deposits
//! 5. guaranteed deposits around each spawn
//!
//! Zoned deposits keep their distance from spawns and guaranteed deposits
//! never grow into a spawn's immediate radius, so start areas stay empty.

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::MapGenConfig;
use crate::error::{MapGenError, Result};
use crate::math::{is_within_bounds, Point};
use crate::resources::{
    generate_zoned_resource_deposits, place_guaranteed_spawn_resources, GuaranteedReport, ResourceReport,
    ResourceType,
};
use crate::spawn::{calculate_spawn_points, SpawnPoint};
use crate::terrain::{
    ensure_spawn_accessibility, generate_base_terrain, ClearanceReport, TerrainGrid, TerrainReport, TerrainType,
};

/// Map dimensions. Both sides are always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "MapSizeRecord")]
pub struct MapSize {
    x: i32,
    y: i32,
}

#[derive(Deserialize)]
struct MapSizeRecord {
    x: i32,
    y: i32,
}

impl TryFrom<MapSizeRecord> for MapSize {
    type Error = MapGenError;

    fn try_from(record: MapSizeRecord) -> Result<Self> {
        Self::try_new(i64::from(record.x), i64::from(record.y))
    }
}

impl MapSize {
    /// Create a size, rejecting zero, negative or oversized sides.
    pub fn try_new(x: i64, y: i64) -> Result<Self> {
        match (i32::try_from(x), i32::try_from(y)) {
            (Ok(w), Ok(h)) if w > 0 && h > 0 => Ok(Self { x: w, y: h }),
            _ => Err(MapGenError::InvalidMapSize { x, y }),
        }
    }

    /// Width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.x.unsigned_abs()
    }

    /// Height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.y.unsigned_abs()
    }

    /// Cell count.
    #[must_use]
    pub const fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }
}

impl fmt::Display for MapSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.x, self.y)
    }
}

/// Unique map identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapId(Uuid);

impl MapId {
    /// Fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MapId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of the game session a map was generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Counts from every generation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Players the map was generated for.
    pub players: u32,
    /// Base terrain passes.
    pub terrain: TerrainReport,
    /// Zoned deposits.
    pub resources: ResourceReport,
    /// Per-spawn deposits.
    pub guaranteed: GuaranteedReport,
    /// Spawn clearance.
    pub clearance: ClearanceReport,
}

/// Generation output before it is attached to a map.
///
/// Serializes as `{ "terrainData": [[..]], "spawnPoints": [..] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedMap {
    /// Terrain rows.
    pub terrain_data: TerrainGrid,
    /// Spawn points, one per player.
    pub spawn_points: Vec<SpawnPoint>,
    /// Pass counts. Not part of the artifact.
    #[serde(skip)]
    pub report: GenerationReport,
}

impl GeneratedMap {
    /// Attach the output to a map with the given identity.
    pub fn into_map(self, id: MapId, size: MapSize) -> Result<Map> {
        Map::from_parts(id, size, self.terrain_data, self.spawn_points)
    }
}

/// Generate terrain and spawns for `players` on a map of `size`.
///
/// The same config, size, player count and RNG state always give the same
/// output.
pub fn generate_map<R: Rng + ?Sized>(
    size: MapSize,
    players: u32,
    config: &MapGenConfig,
    rng: &mut R,
) -> Result<GeneratedMap> {
    config.validate()?;
    let (width, height) = (size.width(), size.height());

    let spawn_points = calculate_spawn_points(width, height, players, &config.spawns, rng)?;
    let spawns: Vec<Point> = spawn_points.iter().map(SpawnPoint::position).collect();

    let (mut grid, terrain) = generate_base_terrain(width, height, &config.terrain, rng);
    let clearance = ensure_spawn_accessibility(&mut grid, &spawns, &config.terrain.spawn_clearance);
    let resources = generate_zoned_resource_deposits(&mut grid, &spawns, players, &config.resources, rng);
    let guaranteed = place_guaranteed_spawn_resources(
        &mut grid,
        &spawns,
        &config.resources.spawn_resources,
        &config.terrain.spawn_clearance,
        rng,
    );

    if guaranteed.placed < guaranteed.requested {
        warn!(
            requested = guaranteed.requested,
            placed = guaranteed.placed,
            "some spawn deposits could not be placed"
        );
    }

    #[cfg(feature = "debug-validation")]
    check_generated(&grid, size, &spawns, config)?;

    info!(
        size = %size,
        players,
        gold = resources.clusters_placed(ResourceType::Gold),
        iron = resources.clusters_placed(ResourceType::Iron),
        crystal = resources.clusters_placed(ResourceType::Crystal),
        "map generated"
    );

    Ok(GeneratedMap {
        terrain_data: grid,
        spawn_points,
        report: GenerationReport {
            players,
            terrain,
            resources,
            guaranteed,
            clearance,
        },
    })
}

#[cfg(feature = "debug-validation")]
fn check_generated(grid: &TerrainGrid, size: MapSize, spawns: &[Point], config: &MapGenConfig) -> Result<()> {
    if grid.width() != size.width() || grid.height() != size.height() {
        return Err(MapGenError::TerrainShape {
            expected_rows: size.height(),
            expected_cols: size.width(),
            detail: format!("{}x{} grid", grid.width(), grid.height()),
        });
    }
    let immediate = f64::from(config.terrain.spawn_clearance.immediate_radius);
    for (position, cell) in grid.iter() {
        let buried = spawns.iter().any(|s| position.distance(*s) <= immediate) && *cell != TerrainType::Empty;
        if buried {
            return Err(MapGenError::InvalidMap(format!("cell {position:?} near a spawn is not empty")));
        }
    }
    Ok(())
}

/// A playable map: identity, size, terrain and spawns.
///
/// Serializes in camelCase as
/// `{ "id", "size": { "x", "y" }, "terrainData", "spawnPoints" }`. Decoding
/// rejects terrain that does not match the size and spawns that are off the
/// map or shared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "MapRecord")]
pub struct Map {
    id: MapId,
    size: MapSize,
    terrain_data: TerrainGrid,
    spawn_points: Vec<SpawnPoint>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapRecord {
    id: MapId,
    size: MapSize,
    terrain_data: TerrainGrid,
    spawn_points: Vec<SpawnPoint>,
}

impl TryFrom<MapRecord> for Map {
    type Error = MapGenError;

    fn try_from(record: MapRecord) -> Result<Self> {
        Self::from_parts(record.id, record.size, record.terrain_data, record.spawn_points)
    }
}

impl Map {
    /// An all-dirt map with no spawns.
    #[must_use]
    pub fn new(id: MapId, size: MapSize) -> Self {
        Self {
            id,
            size,
            terrain_data: TerrainGrid::create_empty(size.width(), size.height(), TerrainType::Dirt),
            spawn_points: Vec::new(),
        }
    }

    /// Assemble a map, checking terrain shape and spawn placement.
    pub fn from_parts(
        id: MapId,
        size: MapSize,
        terrain_data: TerrainGrid,
        spawn_points: Vec<SpawnPoint>,
    ) -> Result<Self> {
        if terrain_data.width() != size.width() || terrain_data.height() != size.height() {
            return Err(MapGenError::TerrainShape {
                expected_rows: size.height(),
                expected_cols: size.width(),
                detail: format!("{} rows of {}", terrain_data.height(), terrain_data.width()),
            });
        }
        for (i, spawn) in spawn_points.iter().enumerate() {
            if !is_within_bounds(spawn.position(), size.width(), size.height()) {
                return Err(MapGenError::InvalidMap(format!(
                    "spawn ({}, {}) is outside the {size} map",
                    spawn.x(),
                    spawn.y()
                )));
            }
            if spawn_points[..i].contains(spawn) {
                return Err(MapGenError::InvalidMap(format!(
                    "spawn ({}, {}) is used twice",
                    spawn.x(),
                    spawn.y()
                )));
            }
        }
        Ok(Self {
            id,
            size,
            terrain_data,
            spawn_points,
        })
    }

    /// Generate a fresh map.
    pub fn generated<R: Rng + ?Sized>(
        id: MapId,
        size: MapSize,
        players: u32,
        config: &MapGenConfig,
        rng: &mut R,
    ) -> Result<(Self, GenerationReport)> {
        let mut map = Self::new(id, size);
        let report = map.generate(players, config, rng)?;
        Ok((map, report))
    }

    /// Replace terrain and spawns with newly generated ones.
    ///
    /// On error the map is left unchanged.
    pub fn generate<R: Rng + ?Sized>(
        &mut self,
        players: u32,
        config: &MapGenConfig,
        rng: &mut R,
    ) -> Result<GenerationReport> {
        let generated = generate_map(self.size, players, config, rng)?;
        self.terrain_data = generated.terrain_data;
        self.spawn_points = generated.spawn_points;
        Ok(generated.report)
    }

    /// Identifier.
    #[must_use]
    pub const fn id(&self) -> MapId {
        self.id
    }

    /// Dimensions.
    #[must_use]
    pub const fn size(&self) -> MapSize {
        self.size
    }

    /// Terrain grid.
    #[must_use]
    pub const fn terrain_data(&self) -> &TerrainGrid {
        &self.terrain_data
    }

    /// Spawn points.
    #[must_use]
    pub fn spawn_points(&self) -> &[SpawnPoint] {
        &self.spawn_points
    }

    /// Terrain at a cell, `None` off the map.
    #[must_use]
    pub fn terrain_at(&self, x: i32, y: i32) -> Option<TerrainType> {
        self.terrain_data.get(Point::new(x, y)).copied()
    }

    /// Dig out a cell.
    ///
    /// Returns `false` and leaves the map unchanged when the cell is off the
    /// map, bedrock, or already empty. Anything else becomes empty.
    pub fn dig_terrain(&mut self, x: i32, y: i32) -> bool {
        match self.terrain_data.get_mut(Point::new(x, y)) {
            Some(cell) if cell.is_diggable() => {
                *cell = TerrainType::Empty;
                true
            }
            _ => false,
        }
    }

    /// Whether units can walk through a cell. Off-map cells are impassable.
    #[must_use]
    pub fn is_terrain_passable(&self, x: i32, y: i32) -> bool {
        self.terrain_at(x, y).is_some_and(TerrainType::is_passable)
    }

    /// Whether a building can be placed on a cell.
    #[must_use]
    pub fn can_build_at(&self, x: i32, y: i32) -> bool {
        self.is_terrain_passable(x, y)
    }

    /// Cell count per terrain type. Types that do not occur are omitted.
    #[must_use]
    pub fn terrain_counts(&self) -> BTreeMap<TerrainType, usize> {
        let mut counts = BTreeMap::new();
        for (_, cell) in self.terrain_data.iter() {
            *counts.entry(*cell).or_insert(0) += 1;
        }
        counts
    }

    /// Encode to compact binary.
    pub fn encode(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| MapGenError::Encoding(format!("Failed to encode map: {e}")))
    }

    /// Decode from [`Map::encode`] output.
    pub fn decode(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data).map_err(|e| MapGenError::Encoding(format!("Failed to decode map: {e}")))
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| MapGenError::Encoding(format!("Failed to write map JSON: {e}")))
    }

    /// Serialize to indented JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| MapGenError::Encoding(format!("Failed to write map JSON: {e}")))
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| MapGenError::Encoding(format!("Failed to read map JSON: {e}")))
    }
}
