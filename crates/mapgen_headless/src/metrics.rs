//! Quality metrics for generated maps.
//!
//! [`MapMetrics`] describes one map, [`BatchSummary`] aggregates many.

use std::collections::BTreeMap;

use mapgen_core::map::{GenerationReport, Map};
use mapgen_core::math::{min_pairwise_distance, Point};
use mapgen_core::resources::ResourceType;
use mapgen_core::spawn::SpawnPoint;
use mapgen_core::terrain::{TerrainGrid, TerrainType};
use serde::{Deserialize, Serialize};

/// Metrics for a single generated map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMetrics {
    /// Seed the map was generated from.
    pub seed: u64,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
    /// Players.
    pub players: u32,
    /// Cells per terrain type.
    pub terrain_histogram: BTreeMap<TerrainType, usize>,
    /// Share of cells holding a deposit.
    pub resource_coverage: f64,
    /// Smallest distance between two spawns. `None` below two players.
    pub min_spawn_separation: Option<f64>,
    /// Whether every spawn's immediate area is empty.
    pub spawns_clear: bool,
    /// Zoned gold deposits.
    pub gold_clusters: u32,
    /// Zoned iron deposits.
    pub iron_clusters: u32,
    /// Zoned crystal deposits.
    pub crystal_clusters: u32,
    /// Zoned deposits requested but not placed.
    pub clusters_missing: u32,
    /// Per-spawn deposits placed.
    pub guaranteed_placed: u32,
}

impl MapMetrics {
    /// Measure a map and its generation report.
    #[must_use]
    pub fn collect(map: &Map, report: &GenerationReport, seed: u64, immediate_radius: u32) -> Self {
        let grid = map.terrain_data();
        let terrain_histogram = map.terrain_counts();
        let resource_cells: usize = terrain_histogram
            .iter()
            .filter(|(t, _)| t.is_resource())
            .map(|(_, n)| n)
            .sum();
        let spawns: Vec<Point> = map.spawn_points().iter().map(SpawnPoint::position).collect();
        let resources = &report.resources;
        let requested: u32 = resources.placements.iter().map(|p| p.requested).sum();
        let placed: u32 = resources.placements.iter().map(|p| p.placed).sum();

        Self {
            seed,
            width: grid.width(),
            height: grid.height(),
            players: report.players,
            resource_coverage: resource_cells as f64 / grid.len().max(1) as f64,
            terrain_histogram,
            min_spawn_separation: min_pairwise_distance(&spawns),
            spawns_clear: spawns_are_clear(grid, &spawns, immediate_radius),
            gold_clusters: resources.clusters_placed(ResourceType::Gold),
            iron_clusters: resources.clusters_placed(ResourceType::Iron),
            crystal_clusters: resources.clusters_placed(ResourceType::Crystal),
            clusters_missing: requested.saturating_sub(placed),
            guaranteed_placed: report.guaranteed.placed,
        }
    }
}

/// Whether every cell within `radius` of each spawn is empty.
#[must_use]
pub fn spawns_are_clear(grid: &TerrainGrid, spawns: &[Point], radius: u32) -> bool {
    let r = radius as i32;
    spawns.iter().all(|&spawn| {
        (-r..=r).all(|dy| {
            (-r..=r).all(|dx| {
                let p = spawn + Point::new(dx, dy);
                p.distance(spawn) > f64::from(radius)
                    || grid.get(p).map_or(true, |t| *t == TerrainType::Empty)
            })
        })
    })
}

/// Summary statistics across a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Maps measured.
    pub total_maps: u32,
    /// Maps whose spawns were all clear.
    pub clear_spawn_maps: u32,
    /// Average resource coverage.
    pub avg_resource_coverage: f64,
    /// Smallest spawn separation seen.
    pub min_spawn_separation: Option<f64>,
    /// Average zoned deposits per map.
    pub avg_clusters: f64,
    /// Total zoned deposits that could not be placed.
    pub clusters_missing: u32,
    /// Terrain cells summed over all maps.
    pub terrain_totals: BTreeMap<TerrainType, usize>,
}

impl BatchSummary {
    /// Calculate summary from per-map metrics.
    #[must_use]
    pub fn from_maps(maps: &[MapMetrics]) -> Self {
        if maps.is_empty() {
            return Self::default();
        }
        let count = maps.len() as f64;
        let mut summary = Self {
            total_maps: maps.len() as u32,
            ..Self::default()
        };

        let mut coverage = 0.0;
        let mut clusters = 0u64;
        for m in maps {
            if m.spawns_clear {
                summary.clear_spawn_maps += 1;
            }
            coverage += m.resource_coverage;
            clusters += u64::from(m.gold_clusters + m.iron_clusters + m.crystal_clusters);
            summary.clusters_missing += m.clusters_missing;
            if let Some(d) = m.min_spawn_separation {
                summary.min_spawn_separation = Some(summary.min_spawn_separation.map_or(d, |s| s.min(d)));
            }
            for (terrain, n) in &m.terrain_histogram {
                *summary.terrain_totals.entry(*terrain).or_insert(0) += n;
            }
        }
        summary.avg_resource_coverage = coverage / count;
        summary.avg_clusters = clusters as f64 / count;
        summary
    }

    /// Whether every map kept its spawns clear.
    #[must_use]
    pub const fn all_spawns_clear(&self) -> bool {
        self.clear_spawn_maps == self.total_maps
    }
}
