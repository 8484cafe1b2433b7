//! Resource deposits: how many, where, and how big.
//!
//! Needs scale with map area and player count. Deposits are placed in
//! concentric zones around the map center with the placement engine, then
//! grown with flood fill. Every spawn additionally gets a small iron and gold
//! deposit nearby.
//!
//! Placement failures are soft. A cluster that finds no valid position is
//! skipped and counted in the report.

use std::f64::consts::{FRAC_PI_4, PI};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::flood_fill::{flood_fill, FloodFillConfig};
use crate::grid::{GridAccess, Guarded};
use crate::math::{map_center, max_distance_from_center, polar_to_cartesian, Point};
use crate::placement::{
    exclusion_zones, find_valid_position, PlacedObject, PlacementConfig, PlacementZone,
    DEFAULT_EDGE_MARGIN, DEFAULT_MAX_ATTEMPTS,
};
use crate::rng::{random_angle, random_in_range, random_int_inclusive};
use crate::terrain::{terrain_accessor, SpawnClearance, TerrainGrid, TerrainType};

/// Resource kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    /// Gold.
    Gold,
    /// Iron.
    Iron,
    /// Crystal.
    Crystal,
}

impl ResourceType {
    /// Terrain written for this resource.
    #[must_use]
    pub const fn terrain(self) -> TerrainType {
        match self {
            Self::Gold => TerrainType::GoldCluster,
            Self::Iron => TerrainType::IronCluster,
            Self::Crystal => TerrainType::CrystalCluster,
        }
    }

    /// Resource of a deposit cell, if it is one.
    #[must_use]
    pub const fn from_terrain(terrain: TerrainType) -> Option<Self> {
        match terrain {
            TerrainType::GoldCluster => Some(Self::Gold),
            TerrainType::IronCluster => Some(Self::Iron),
            TerrainType::CrystalCluster => Some(Self::Crystal),
            _ => None,
        }
    }
}

/// Concentric placement zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneType {
    /// Around the map center.
    Central,
    /// Ring outside the central zone.
    Middle,
    /// Outermost ring, reaching the corners.
    Outer,
}

/// Cluster size and fill density.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Smallest radius.
    pub min_radius: u32,
    /// Largest radius (inclusive).
    pub max_radius: u32,
    /// Flood-fill density.
    pub density: f64,
}

impl ClusterConfig {
    /// Create a cluster config.
    #[must_use]
    pub const fn new(min_radius: u32, max_radius: u32, density: f64) -> Self {
        Self {
            min_radius,
            max_radius,
            density,
        }
    }

    /// Uniform radius in `[min_radius, max_radius]`.
    pub fn generate_radius<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        random_int_inclusive(rng, self.min_radius as i32, self.max_radius as i32) as u32
    }
}

/// Per-zone cluster shapes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterTable {
    /// Crystal in the central zone.
    pub crystal_central: ClusterConfig,
    /// Gold in the central zone.
    pub gold_central: ClusterConfig,
    /// Gold in the middle zone.
    pub gold_middle: ClusterConfig,
    /// Iron in the outer zone.
    pub iron_outer: ClusterConfig,
}

impl Default for ClusterTable {
    fn default() -> Self {
        Self {
            crystal_central: ClusterConfig::new(3, 6, 0.95),
            gold_central: ClusterConfig::new(4, 7, 0.85),
            gold_middle: ClusterConfig::new(2, 5, 0.75),
            iron_outer: ClusterConfig::new(3, 7, 0.70),
        }
    }
}

/// Spacing rules shared by all deposit types.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpacingConfig {
    /// Minimum distance between deposits of the same type.
    pub min_distance_from_same_type: f64,
    /// Minimum distance between deposits of different types.
    pub min_distance_from_other_types: f64,
    /// No deposit center this close to a spawn.
    pub exclusion_radius_from_spawns: f64,
    /// Deposit centers keep this far from the map edge.
    pub edge_margin: i32,
    /// Attempt budget per cluster.
    pub max_attempts: u32,
    /// A zone batch stops after this many clusters in a row fail.
    pub max_consecutive_failures: u32,
}

impl Default for SpacingConfig {
    fn default() -> Self {
        Self {
            min_distance_from_same_type: 8.0,
            min_distance_from_other_types: 15.0,
            exclusion_radius_from_spawns: 12.0,
            edge_margin: DEFAULT_EDGE_MARGIN,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_consecutive_failures: 5,
        }
    }
}

/// Small deposits next to every spawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnResourceConfig {
    /// Types placed per spawn, in order.
    pub types: Vec<ResourceType>,
    /// Closest deposit center to the spawn.
    pub min_distance: f64,
    /// Farthest deposit center from the spawn.
    pub max_distance: f64,
    /// Deposit shape.
    pub cluster: ClusterConfig,
    /// Attempt budget per deposit.
    pub max_attempts: u32,
}

impl Default for SpawnResourceConfig {
    fn default() -> Self {
        Self {
            types: vec![ResourceType::Iron, ResourceType::Gold],
            min_distance: 4.0,
            max_distance: 8.0,
            cluster: ClusterConfig::new(2, 2, 0.8),
            max_attempts: 50,
        }
    }
}

/// Resource generation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Gold deposits per cell at two players.
    pub base_resource_density: f64,
    /// Growth per player beyond two.
    pub player_multiplier: f64,
    /// Crystal count as a fraction of gold.
    pub crystal_fraction: f64,
    /// Iron count as a fraction of gold.
    pub iron_fraction: f64,
    /// Share of gold placed in the central zone.
    pub gold_central_fraction: f64,
    /// Central zone outer radius, as a fraction of the farthest-corner distance.
    pub central_zone_radius_percent: f64,
    /// Middle zone outer radius, as a fraction of the farthest-corner distance.
    pub middle_zone_radius_percent: f64,
    /// Outer zone inner radius. Equal to the central radius by default, so
    /// the outer zone overlaps the middle one.
    pub outer_zone_min_percent: f64,
    /// Cluster shapes per zone.
    pub clusters: ClusterTable,
    /// Spacing rules.
    pub spacing: SpacingConfig,
    /// Per-spawn deposits.
    pub spawn_resources: SpawnResourceConfig,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            base_resource_density: 0.025,
            player_multiplier: 1.3,
            crystal_fraction: 0.3,
            iron_fraction: 0.8,
            gold_central_fraction: 0.4,
            central_zone_radius_percent: 0.4,
            middle_zone_radius_percent: 0.7,
            outer_zone_min_percent: 0.4,
            clusters: ClusterTable::default(),
            spacing: SpacingConfig::default(),
            spawn_resources: SpawnResourceConfig::default(),
        }
    }
}

impl ResourceConfig {
    /// Set the baseline density.
    #[must_use]
    pub fn with_base_density(mut self, density: f64) -> Self {
        self.base_resource_density = density;
        self
    }

    /// Set the outer zone inner radius.
    #[must_use]
    pub fn with_outer_zone_min_percent(mut self, percent: f64) -> Self {
        self.outer_zone_min_percent = percent;
        self
    }

    /// Cluster shape for a resource in a zone. `None` for combinations that are never placed.
    #[must_use]
    pub const fn cluster_config(&self, resource: ResourceType, zone: ZoneType) -> Option<ClusterConfig> {
        match (resource, zone) {
            (ResourceType::Crystal, ZoneType::Central) => Some(self.clusters.crystal_central),
            (ResourceType::Gold, ZoneType::Central) => Some(self.clusters.gold_central),
            (ResourceType::Gold, ZoneType::Middle) => Some(self.clusters.gold_middle),
            (ResourceType::Iron, ZoneType::Outer) => Some(self.clusters.iron_outer),
            _ => None,
        }
    }

    /// Zones a resource may be placed in.
    #[must_use]
    pub const fn allowed_zones(resource: ResourceType) -> &'static [ZoneType] {
        match resource {
            ResourceType::Crystal => &[ZoneType::Central],
            ResourceType::Gold => &[ZoneType::Central, ZoneType::Middle],
            ResourceType::Iron => &[ZoneType::Outer],
        }
    }

    /// Separation required between two deposit types.
    #[must_use]
    pub fn distance_for(&self, a: ResourceType, b: ResourceType) -> f64 {
        if a == b {
            self.spacing.min_distance_from_same_type
        } else {
            self.spacing.min_distance_from_other_types
        }
    }
}

/// Deposits guaranteed per spawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuaranteedPerSpawn {
    /// Iron deposits.
    pub iron: u32,
    /// Gold deposits.
    pub gold: u32,
}

/// How many deposits to place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceNeeds {
    /// Crystal deposits, central zone.
    pub crystals_in_central_zone: u32,
    /// Gold deposits, central zone.
    pub gold_in_central_zone: u32,
    /// Gold deposits, middle zone.
    pub gold_in_middle_zone: u32,
    /// Iron deposits, outer zone.
    pub iron_in_outer_zone: u32,
    /// Extra deposits next to each spawn.
    pub guaranteed_per_spawn: GuaranteedPerSpawn,
}

impl ResourceNeeds {
    /// Gold over all zones.
    #[must_use]
    pub const fn total_gold(&self) -> u32 {
        self.gold_in_central_zone + self.gold_in_middle_zone
    }

    /// Deposits wanted for a resource in a zone.
    #[must_use]
    pub const fn count_for(&self, resource: ResourceType, zone: ZoneType) -> u32 {
        match (resource, zone) {
            (ResourceType::Crystal, ZoneType::Central) => self.crystals_in_central_zone,
            (ResourceType::Gold, ZoneType::Central) => self.gold_in_central_zone,
            (ResourceType::Gold, ZoneType::Middle) => self.gold_in_middle_zone,
            (ResourceType::Iron, ZoneType::Outer) => self.iron_in_outer_zone,
            _ => 0,
        }
    }
}

/// Deposit counts for a map.
///
/// Gold is `floor(area * density * multiplier^max(0, players - 2))`; crystal and
/// iron are fixed fractions of gold; gold is split between central and middle.
#[must_use]
pub fn calculate_resource_needs(width: u32, height: u32, players: u32, config: &ResourceConfig) -> ResourceNeeds {
    let area = f64::from(width) * f64::from(height);
    let exponent = players.saturating_sub(2) as i32;
    let gold_total = (area * config.base_resource_density * config.player_multiplier.powi(exponent)).floor();
    let gold_central = (gold_total * config.gold_central_fraction).floor();

    ResourceNeeds {
        crystals_in_central_zone: (gold_total * config.crystal_fraction).floor() as u32,
        gold_in_central_zone: gold_central as u32,
        gold_in_middle_zone: (gold_total - gold_central) as u32,
        iron_in_outer_zone: (gold_total * config.iron_fraction).floor() as u32,
        guaranteed_per_spawn: GuaranteedPerSpawn { iron: 1, gold: 1 },
    }
}

/// Placement annuli around the map center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceZones {
    /// `[0, central)`.
    pub central: PlacementZone,
    /// `[central, middle)`.
    pub middle: PlacementZone,
    /// `[outer_min, max)`.
    pub outer: PlacementZone,
}

impl ResourceZones {
    /// Zone by type.
    #[must_use]
    pub const fn zone(&self, zone: ZoneType) -> &PlacementZone {
        match zone {
            ZoneType::Central => &self.central,
            ZoneType::Middle => &self.middle,
            ZoneType::Outer => &self.outer,
        }
    }
}

/// Zones for a map, as fractions of the center-to-corner distance.
#[must_use]
pub fn calculate_resource_zones(width: u32, height: u32, config: &ResourceConfig) -> ResourceZones {
    let center = map_center(width, height);
    let max_distance = max_distance_from_center(width, height);
    let central = max_distance * config.central_zone_radius_percent;
    let middle = max_distance * config.middle_zone_radius_percent;
    let outer_min = max_distance * config.outer_zone_min_percent;

    ResourceZones {
        central: PlacementZone::new(center, 0.0, central),
        middle: PlacementZone::new(center, central, middle),
        outer: PlacementZone::new(center, outer_min, max_distance),
    }
}

/// A deposit placed during generation.
pub type ResourceCluster = PlacedObject<ResourceType>;

/// Outcome of one resource/zone batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZonePlacement {
    /// Resource placed.
    pub resource: ResourceType,
    /// Zone placed in.
    pub zone: ZoneType,
    /// Clusters wanted.
    pub requested: u32,
    /// Clusters placed.
    pub placed: u32,
    /// Clusters skipped after exhausting their attempts.
    pub failed: u32,
    /// Candidate positions sampled.
    pub attempts: u32,
    /// Cells written by flood fill.
    pub cells: u32,
}

/// Outcome of zoned deposit placement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceReport {
    /// Counts that were requested.
    pub needs: ResourceNeeds,
    /// One entry per resource/zone batch, in placement order.
    pub placements: Vec<ZonePlacement>,
    /// Deposits placed, in placement order.
    pub clusters: Vec<ResourceCluster>,
}

impl ResourceReport {
    /// Deposits placed for a resource over all zones.
    #[must_use]
    pub fn clusters_placed(&self, resource: ResourceType) -> u32 {
        self.placements
            .iter()
            .filter(|p| p.resource == resource)
            .map(|p| p.placed)
            .sum()
    }
}

/// Outcome of per-spawn deposit placement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuaranteedReport {
    /// Deposits wanted.
    pub requested: u32,
    /// Deposits placed.
    pub placed: u32,
    /// Target cells sampled.
    pub attempts: u32,
}

const PLACEMENT_ORDER: [(ResourceType, ZoneType); 4] = [
    (ResourceType::Crystal, ZoneType::Central),
    (ResourceType::Gold, ZoneType::Central),
    (ResourceType::Gold, ZoneType::Middle),
    (ResourceType::Iron, ZoneType::Outer),
];

/// Place zoned deposits: crystal, then gold (central, middle), then iron.
///
/// Deposit centers avoid spawns, map edges, bedrock and each other. Clusters
/// grow with flood fill and never overwrite bedrock.
pub fn generate_zoned_resource_deposits<R: Rng + ?Sized>(
    grid: &mut TerrainGrid,
    spawns: &[Point],
    players: u32,
    config: &ResourceConfig,
    rng: &mut R,
) -> ResourceReport {
    let (width, height) = (grid.width(), grid.height());
    let needs = calculate_resource_needs(width, height, players, config);
    let zones = calculate_resource_zones(width, height, config);
    let exclusions = exclusion_zones(spawns, config.spacing.exclusion_radius_from_spawns);
    let multiplier = config.spacing.min_distance_from_other_types / config.spacing.min_distance_from_same_type;

    let mut report = ResourceReport {
        needs,
        ..ResourceReport::default()
    };
    let mut access = terrain_accessor(grid);

    for (resource, zone_type) in PLACEMENT_ORDER {
        let requested = needs.count_for(resource, zone_type);
        let Some(cluster) = config.cluster_config(resource, zone_type) else {
            continue;
        };
        let mut batch = ZonePlacement {
            resource,
            zone: zone_type,
            requested,
            placed: 0,
            failed: 0,
            attempts: 0,
            cells: 0,
        };
        let mut consecutive_failures = 0;

        for _ in 0..requested {
            let found = {
                let can_modify = |p: Point| access.can_modify(p);
                let placement = PlacementConfig::new(
                    *zones.zone(zone_type),
                    resource,
                    config.spacing.min_distance_from_same_type,
                )
                .with_existing(&report.clusters)
                .with_exclusions(&exclusions)
                .with_different_type_multiplier(multiplier)
                .with_edge_margin(config.spacing.edge_margin)
                .with_max_attempts(config.spacing.max_attempts)
                .with_validation(&can_modify);
                find_valid_position(&placement, |p| access.in_bounds(p), rng)
            };
            batch.attempts += found.attempts;

            let Some(position) = found.position else {
                batch.failed += 1;
                consecutive_failures += 1;
                trace!(?resource, zone = ?zone_type, attempts = found.attempts, "no valid deposit position");
                if consecutive_failures >= config.spacing.max_consecutive_failures {
                    break;
                }
                continue;
            };
            consecutive_failures = 0;

            let radius = cluster.generate_radius(rng);
            let fill = flood_fill(
                &mut access,
                position,
                &resource.terrain(),
                &FloodFillConfig::new(radius, cluster.density),
                rng,
            );
            batch.cells += fill.cells_modified as u32;
            batch.placed += 1;
            report.clusters.push(PlacedObject::new(position, resource, radius));
        }

        debug!(
            ?resource,
            zone = ?zone_type,
            requested = batch.requested,
            placed = batch.placed,
            attempts = batch.attempts,
            "resource zone filled"
        );
        report.placements.push(batch);
    }

    report
}

/// Place small deposits around every spawn.
///
/// Each deposit center is drawn in the `[min_distance, max_distance)` band
/// around the spawn. The second and later deposits of a spawn aim roughly
/// opposite the previous one so they do not pile up.
///
/// Runs after the spawn accessibility pass. Deposits never grow into the
/// immediate radius of any spawn, so start areas stay empty.
pub fn place_guaranteed_spawn_resources<R: Rng + ?Sized>(
    grid: &mut TerrainGrid,
    spawns: &[Point],
    config: &SpawnResourceConfig,
    clearance: &SpawnClearance,
    rng: &mut R,
) -> GuaranteedReport {
    let mut report = GuaranteedReport::default();
    let immediate = f64::from(clearance.immediate_radius);
    let mut access = Guarded::new(grid, |position: Point, terrain: &TerrainType| {
        terrain.can_modify() && spawns.iter().all(|s| position.distance(*s) > immediate)
    });

    for &spawn in spawns {
        let mut previous_angle: Option<f64> = None;
        for &resource in &config.types {
            report.requested += 1;
            let mut placed_at = None;

            for _ in 0..config.max_attempts {
                report.attempts += 1;
                let angle = match previous_angle {
                    Some(previous) => previous + PI + random_in_range(rng, -FRAC_PI_4, FRAC_PI_4),
                    None => random_angle(rng),
                };
                let distance = random_in_range(rng, config.min_distance, config.max_distance);
                let target = polar_to_cartesian(spawn, angle, distance);
                if access.in_bounds(target) && access.can_modify(target) {
                    placed_at = Some((target, angle));
                    break;
                }
            }

            let Some((target, angle)) = placed_at else {
                trace!(x = spawn.x, y = spawn.y, ?resource, "no room for spawn deposit");
                continue;
            };
            previous_angle = Some(angle);

            let radius = config.cluster.generate_radius(rng);
            flood_fill(
                &mut access,
                target,
                &resource.terrain(),
                &FloodFillConfig::new(radius, config.cluster.density),
                rng,
            );
            report.placed += 1;
        }
    }

    debug!(
        requested = report.requested,
        placed = report.placed,
        "spawn deposits placed"
    );
    report
}
