//! Test fixtures and helpers.
//!
//! Small hand-drawn grids, fixed seeds and ready-made maps for consistent
//! testing.

use mapgen_core::config::MapGenConfig;
use mapgen_core::map::{Map, MapId, MapSize};
use mapgen_core::rng::{seeded_rng, MapRng};
use mapgen_core::spawn::SpawnPoint;
use mapgen_core::terrain::{TerrainGrid, TerrainType};

/// Seed used by fixtures that need one.
pub const FIXTURE_SEED: u64 = 0x5EED;

/// RNG seeded with [`FIXTURE_SEED`].
#[must_use]
pub fn fixed_rng() -> MapRng {
    seeded_rng(FIXTURE_SEED)
}

/// Map size that is known to be valid.
///
/// # Panics
///
/// Panics if either side is not positive.
#[must_use]
pub fn map_size(x: i64, y: i64) -> MapSize {
    MapSize::try_new(x, y).unwrap()
}

/// Parse one terrain symbol as printed by [`TerrainType::symbol`].
#[must_use]
pub fn terrain_from_symbol(symbol: char) -> Option<TerrainType> {
    TerrainType::ALL.into_iter().find(|t| t.symbol() == symbol)
}

/// Build a grid from rows of terrain symbols.
///
/// ```ignore
/// let grid = grid_from_rows(&["..#", "X G"]);
/// ```
///
/// # Panics
///
/// Panics on unknown symbols or ragged rows.
#[must_use]
pub fn grid_from_rows(rows: &[&str]) -> TerrainGrid {
    let rows: Vec<Vec<TerrainType>> = rows
        .iter()
        .map(|row| {
            row.chars()
                .map(|c| terrain_from_symbol(c).unwrap_or_else(|| panic!("unknown terrain symbol {c:?}")))
                .collect()
        })
        .collect();
    TerrainGrid::from_rows(rows).unwrap()
}

/// Map built from symbol rows with the given spawns.
///
/// # Panics
///
/// Panics if the rows or spawns are invalid.
#[must_use]
pub fn map_from_symbols(rows: &[&str], spawns: &[(i64, i64)]) -> Map {
    let grid = grid_from_rows(rows);
    let size = map_size(i64::from(grid.width()), i64::from(grid.height()));
    let spawns = spawns
        .iter()
        .map(|&(x, y)| SpawnPoint::try_new(x, y).unwrap())
        .collect();
    Map::from_parts(MapId::new(), size, grid, spawns).unwrap()
}

/// Standard 100x100 two-player map from [`FIXTURE_SEED`].
///
/// # Panics
///
/// Panics if generation fails.
#[must_use]
pub fn standard_map() -> Map {
    generated_map(100, 100, 2)
}

/// Generated map of the given size and player count from [`FIXTURE_SEED`].
///
/// # Panics
///
/// Panics if generation fails.
#[must_use]
pub fn generated_map(width: i64, height: i64, players: u32) -> Map {
    let (map, _) = Map::generated(
        MapId::new(),
        map_size(width, height),
        players,
        &MapGenConfig::default(),
        &mut fixed_rng(),
    )
    .unwrap();
    map
}
