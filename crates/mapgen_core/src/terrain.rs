//! Terrain types and the terrain pipeline.
//!
//! Base terrain is built in three passes over a [`TerrainGrid`]:
//! radial layering (bedrock near the center, rock toward the edges),
//! bedrock outcrops, and rock veins over plain dirt. Spawn accessibility is a
//! separate pass run before resources are placed.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::formation::{
    generate_linear_formations_on_grid, generate_radial_formations, LinearFormationConfig,
    LinearFormationResult, RadialFormationConfig, RadialFormationResult,
};
use crate::grid::{Grid, Guarded};
use crate::math::Point;
use crate::noise::{OctaveConfig, PerlinField};
use crate::probability::{multi_layer_probabilities, LayerConfig};

/// Kind of a single map cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum TerrainType {
    /// Diggable soil. Baseline terrain.
    #[default]
    Dirt,
    /// Diggable obstruction.
    Rock,
    /// Permanent. Never dug, never built over, never overwritten by generators.
    Bedrock,
    /// Open ground, after digging or spawn clearing.
    Empty,
    /// Gold deposit.
    GoldCluster,
    /// Crystal deposit.
    CrystalCluster,
    /// Iron deposit.
    IronCluster,
}

impl TerrainType {
    /// All terrain types in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Dirt,
        Self::Rock,
        Self::Bedrock,
        Self::Empty,
        Self::GoldCluster,
        Self::CrystalCluster,
        Self::IronCluster,
    ];

    /// One-character projection used by text renderers.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Dirt => '.',
            Self::Rock => '#',
            Self::Bedrock => 'X',
            Self::Empty => ' ',
            Self::GoldCluster => 'G',
            Self::CrystalCluster => 'C',
            Self::IronCluster => 'I',
        }
    }

    /// Units can walk here. Only open ground is passable.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Resource deposit.
    #[must_use]
    pub const fn is_resource(self) -> bool {
        matches!(self, Self::GoldCluster | Self::CrystalCluster | Self::IronCluster)
    }

    /// Generators may overwrite this cell.
    #[must_use]
    pub const fn can_modify(self) -> bool {
        !matches!(self, Self::Bedrock)
    }

    /// Digging turns this cell into [`TerrainType::Empty`].
    #[must_use]
    pub const fn is_diggable(self) -> bool {
        !matches!(self, Self::Bedrock | Self::Empty)
    }

    /// What spawn clearing turns this cell into outside the immediate radius.
    ///
    /// Bedrock softens to rock and deposits revert to dirt. Nothing is upgraded.
    #[must_use]
    pub const fn downgraded(self) -> Option<Self> {
        match self {
            Self::Bedrock => Some(Self::Rock),
            Self::GoldCluster | Self::CrystalCluster | Self::IronCluster => Some(Self::Dirt),
            _ => None,
        }
    }
}

/// Terrain matrix, `grid[y][x]` when serialized.
pub type TerrainGrid = Grid<TerrainType>;

/// Write gate used by terrain accessors.
pub type TerrainPredicate = fn(Point, &TerrainType) -> bool;

/// Accessor that refuses writes to bedrock.
pub type TerrainAccess<'a> = Guarded<'a, TerrainType, TerrainPredicate>;

fn modifiable(_: Point, terrain: &TerrainType) -> bool {
    terrain.can_modify()
}

/// Wrap `grid` so flood fill and placement never touch bedrock.
pub fn terrain_accessor(grid: &mut TerrainGrid) -> TerrainAccess<'_> {
    Guarded::new(grid, modifiable as TerrainPredicate)
}

/// Radii of the spawn accessibility pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnClearance {
    /// Cells this close to a spawn become [`TerrainType::Empty`].
    pub immediate_radius: u32,
    /// Cells this close are downgraded.
    pub clear_radius: u32,
}

impl Default for SpawnClearance {
    fn default() -> Self {
        Self {
            immediate_radius: 2,
            clear_radius: 4,
        }
    }
}

/// Terrain pipeline configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Rock layer, denser toward the edge.
    pub rock_layer: LayerConfig,
    /// Bedrock layer, denser toward the center.
    pub bedrock_layer: LayerConfig,
    /// Bedrock outcrops.
    pub bedrock_formations: RadialFormationConfig,
    /// Rock veins over dirt.
    pub rock_veins: LinearFormationConfig,
    /// Spawn accessibility radii.
    pub spawn_clearance: SpawnClearance,
    /// How far Perlin noise may shift a cell's layer distance. 0 disables it.
    pub layer_noise: f64,
    /// Octaves of the layer noise field.
    pub layer_noise_octaves: OctaveConfig,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            rock_layer: LayerConfig::new(0.4, false),
            bedrock_layer: LayerConfig::new(0.15, true),
            bedrock_formations: RadialFormationConfig::default(),
            rock_veins: LinearFormationConfig::default(),
            spawn_clearance: SpawnClearance::default(),
            layer_noise: 0.0,
            layer_noise_octaves: OctaveConfig::default(),
        }
    }
}

impl TerrainConfig {
    /// Replace the spawn clearance radii.
    #[must_use]
    pub const fn with_spawn_clearance(mut self, immediate_radius: u32, clear_radius: u32) -> Self {
        self.spawn_clearance = SpawnClearance {
            immediate_radius,
            clear_radius,
        };
        self
    }

    /// Jitter layer boundaries with Perlin noise of the given amplitude.
    #[must_use]
    pub fn with_layer_noise(mut self, amplitude: f64) -> Self {
        self.layer_noise = amplitude;
        self
    }

    /// Replace the bedrock formation settings.
    #[must_use]
    pub const fn with_bedrock_formations(mut self, formations: RadialFormationConfig) -> Self {
        self.bedrock_formations = formations;
        self
    }

    /// Replace the rock vein settings.
    #[must_use]
    pub const fn with_rock_veins(mut self, veins: LinearFormationConfig) -> Self {
        self.rock_veins = veins;
        self
    }
}

/// Counts from the base terrain passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainReport {
    /// Bedrock cells from layering.
    pub layer_bedrock: u32,
    /// Rock cells from layering.
    pub layer_rock: u32,
    /// Bedrock outcrops.
    pub bedrock_formations: RadialFormationResult,
    /// Rock veins.
    pub rock_veins: LinearFormationResult,
}

/// Counts from the spawn accessibility pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearanceReport {
    /// Cells forced to empty.
    pub cells_emptied: u32,
    /// Cells downgraded.
    pub cells_downgraded: u32,
}

/// Dirt grid with radial bedrock and rock layers applied.
///
/// One uniform draw per cell: below the bedrock probability gives bedrock,
/// below bedrock plus rock gives rock, otherwise dirt.
///
/// With a positive `layer_noise` the normalized distance of each cell is
/// shifted by up to that amount using a Perlin field seeded from `rng`, which
/// turns the rings into irregular bands.
pub fn generate_layered_terrain<R: Rng + ?Sized>(
    width: u32,
    height: u32,
    config: &TerrainConfig,
    rng: &mut R,
) -> TerrainGrid {
    let layers = [config.rock_layer, config.bedrock_layer];
    let field = (config.layer_noise > 0.0).then(|| PerlinField::from_rng(rng, config.layer_noise_octaves));
    Grid::create_distance_based(width, height, |distance, x, y| {
        let distance = match &field {
            Some(field) => {
                let shift = (field.normalized(f64::from(x), f64::from(y)) - 0.5) * 2.0 * config.layer_noise;
                (distance + shift).clamp(0.0, 1.0)
            }
            None => distance,
        };
        let probabilities = multi_layer_probabilities(distance, &layers);
        let (rock, bedrock) = (probabilities[0], probabilities[1]);
        let roll = rng.gen::<f64>();
        if roll < bedrock {
            TerrainType::Bedrock
        } else if roll < bedrock + rock {
            TerrainType::Rock
        } else {
            TerrainType::Dirt
        }
    })
}

/// Scatter bedrock outcrops. Overwrites whatever is underneath.
pub fn generate_bedrock_formations<R: Rng + ?Sized>(
    grid: &mut TerrainGrid,
    config: &TerrainConfig,
    rng: &mut R,
) -> RadialFormationResult {
    let (width, height) = (grid.width(), grid.height());
    generate_radial_formations(
        grid,
        width,
        height,
        &config.bedrock_formations,
        &TerrainType::Bedrock,
        rng,
    )
}

/// Draw rock veins, replacing only dirt.
pub fn add_rock_veins<R: Rng + ?Sized>(
    grid: &mut TerrainGrid,
    config: &TerrainConfig,
    rng: &mut R,
) -> LinearFormationResult {
    generate_linear_formations_on_grid(
        grid,
        &config.rock_veins,
        &TerrainType::Rock,
        |_, current| *current == TerrainType::Dirt,
        rng,
    )
}

/// Run layering, bedrock outcrops and rock veins.
pub fn generate_base_terrain<R: Rng + ?Sized>(
    width: u32,
    height: u32,
    config: &TerrainConfig,
    rng: &mut R,
) -> (TerrainGrid, TerrainReport) {
    let mut grid = generate_layered_terrain(width, height, config, rng);
    let mut report = TerrainReport {
        layer_bedrock: grid.count_where(|t| *t == TerrainType::Bedrock) as u32,
        layer_rock: grid.count_where(|t| *t == TerrainType::Rock) as u32,
        ..TerrainReport::default()
    };
    debug!(
        bedrock = report.layer_bedrock,
        rock = report.layer_rock,
        "terrain layers applied"
    );

    report.bedrock_formations = generate_bedrock_formations(&mut grid, config, rng);
    debug!(
        formations = report.bedrock_formations.formations_generated,
        cells = report.bedrock_formations.cells_placed,
        "bedrock formations placed"
    );

    report.rock_veins = add_rock_veins(&mut grid, config, rng);
    debug!(
        veins = report.rock_veins.formations_generated,
        cells = report.rock_veins.elements_placed,
        "rock veins placed"
    );

    (grid, report)
}

/// Clear the area around each spawn.
///
/// Within `immediate_radius` (Euclidean) cells become empty. Between that and
/// `clear_radius` bedrock becomes rock and deposits become dirt.
pub fn ensure_spawn_accessibility(
    grid: &mut TerrainGrid,
    spawns: &[Point],
    clearance: &SpawnClearance,
) -> ClearanceReport {
    let mut report = ClearanceReport::default();
    let clear = clearance.clear_radius as i32;
    let immediate = f64::from(clearance.immediate_radius);
    let outer = f64::from(clearance.clear_radius);

    for &spawn in spawns {
        for dy in -clear..=clear {
            for dx in -clear..=clear {
                let position = spawn + Point::new(dx, dy);
                let Some(cell) = grid.get_mut(position) else {
                    continue;
                };
                let distance = position.distance(spawn);
                if distance <= immediate {
                    *cell = TerrainType::Empty;
                    report.cells_emptied += 1;
                } else if distance <= outer {
                    if let Some(softer) = cell.downgraded() {
                        *cell = softer;
                        report.cells_downgraded += 1;
                    }
                }
            }
        }
    }

    debug!(
        spawns = spawns.len(),
        emptied = report.cells_emptied,
        downgraded = report.cells_downgraded,
        "spawn areas cleared"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridAccess;
    use crate::rng::seeded_rng;

    #[test]
    fn test_symbols_are_distinct() {
        let mut symbols: Vec<char> = TerrainType::ALL.iter().map(|t| t.symbol()).collect();
        symbols.sort_unstable();
        symbols.dedup();
        assert_eq!(symbols.len(), TerrainType::ALL.len());
    }

    #[test]
    fn test_only_empty_is_passable() {
        for terrain in TerrainType::ALL {
            assert_eq!(terrain.is_passable(), terrain == TerrainType::Empty);
        }
    }

    #[test]
    fn test_downgrade_never_upgrades() {
        assert_eq!(TerrainType::Bedrock.downgraded(), Some(TerrainType::Rock));
        assert_eq!(TerrainType::IronCluster.downgraded(), Some(TerrainType::Dirt));
        assert_eq!(TerrainType::Rock.downgraded(), None);
        assert_eq!(TerrainType::Dirt.downgraded(), None);
        assert_eq!(TerrainType::Empty.downgraded(), None);
    }

    #[test]
    fn test_terrain_serializes_by_name() {
        let json = serde_json::to_string(&TerrainType::GoldCluster).unwrap();
        assert_eq!(json, "\"GoldCluster\"");
    }

    #[test]
    fn test_accessor_refuses_bedrock() {
        let mut grid = Grid::from_rows(vec![vec![TerrainType::Bedrock, TerrainType::Rock]]).unwrap();
        let access = terrain_accessor(&mut grid);
        assert!(!access.can_modify(Point::new(0, 0)));
        assert!(access.can_modify(Point::new(1, 0)));
        assert!(!access.can_modify(Point::new(2, 0)));
    }

    #[test]
    fn test_layers_favour_bedrock_in_center() {
        let config = TerrainConfig::default();
        let mut center_bedrock = 0;
        let mut edge_bedrock = 0;
        for seed in 0..10 {
            let grid = generate_layered_terrain(60, 60, &config, &mut seeded_rng(seed));
            for (p, t) in grid.iter() {
                if *t != TerrainType::Bedrock {
                    continue;
                }
                if p.distance(Point::new(30, 30)) < 10.0 {
                    center_bedrock += 1;
                } else if p.distance(Point::new(30, 30)) > 35.0 {
                    edge_bedrock += 1;
                }
            }
        }
        assert!(center_bedrock > edge_bedrock);
    }

    #[test]
    fn test_layer_noise_is_seeded() {
        let config = TerrainConfig::default().with_layer_noise(0.3);
        let a = generate_layered_terrain(60, 60, &config, &mut seeded_rng(9));
        let b = generate_layered_terrain(60, 60, &config, &mut seeded_rng(9));
        assert_eq!(a, b);

        let plain = generate_layered_terrain(60, 60, &TerrainConfig::default(), &mut seeded_rng(9));
        assert_ne!(a, plain);
    }

    #[test]
    fn test_rock_veins_only_replace_dirt() {
        let mut grid = Grid::create_with(50, 50, |x, _| {
            if x % 2 == 0 {
                TerrainType::Dirt
            } else {
                TerrainType::Bedrock
            }
        });
        let veins = add_rock_veins(&mut grid, &TerrainConfig::default(), &mut seeded_rng(4));
        assert!(veins.elements_placed > 0);
        assert_eq!(grid.count_where(|t| *t == TerrainType::Bedrock), 25 * 50);
    }

    #[test]
    fn test_base_terrain_shape() {
        let (grid, report) = generate_base_terrain(37, 23, &TerrainConfig::default(), &mut seeded_rng(9));
        assert_eq!(grid.width(), 37);
        assert_eq!(grid.height(), 23);
        assert_eq!(report.bedrock_formations.formations_generated, 1);
        assert!(grid.iter().all(|(_, t)| matches!(
            t,
            TerrainType::Dirt | TerrainType::Rock | TerrainType::Bedrock
        )));
    }

    #[test]
    fn test_spawn_accessibility_empties_and_downgrades() {
        let mut grid = Grid::create_with(20, 20, |x, _| {
            if x < 10 {
                TerrainType::Bedrock
            } else {
                TerrainType::GoldCluster
            }
        });
        let spawn = Point::new(10, 10);
        let report = ensure_spawn_accessibility(&mut grid, &[spawn], &SpawnClearance::default());

        for (p, t) in grid.iter() {
            let d = p.distance(spawn);
            if d <= 2.0 {
                assert_eq!(*t, TerrainType::Empty);
            } else if d <= 4.0 {
                assert!(matches!(t, TerrainType::Rock | TerrainType::Dirt));
            } else {
                assert!(matches!(t, TerrainType::Bedrock | TerrainType::GoldCluster));
            }
        }
        assert_eq!(report.cells_emptied, 13);
        assert_eq!(report.cells_downgraded, 49 - 13);
    }

    #[test]
    fn test_spawn_accessibility_clips_at_edges() {
        let mut grid = Grid::create_empty(5, 5, TerrainType::Rock);
        ensure_spawn_accessibility(&mut grid, &[Point::new(0, 0)], &SpawnClearance::default());
        assert_eq!(grid.get(Point::new(0, 0)), Some(&TerrainType::Empty));
        assert_eq!(grid.get(Point::new(2, 0)), Some(&TerrainType::Empty));
        assert_eq!(grid.get(Point::new(3, 0)), Some(&TerrainType::Rock));
    }
}
