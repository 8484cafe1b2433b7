//! Probabilistic breadth-first growth of contiguous clusters.
//!
//! Growth starts at a center cell and walks outward one graph step at a time.
//! Each visited cell is accepted with a probability that decays with its
//! step distance (see [`contiguous_probability`]). Only accepted cells
//! propagate, so clusters stay connected to their center.

use std::collections::{HashSet, VecDeque};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::grid::{Grid, GridAccess, Guarded};
use crate::math::{Point, DIRECTIONS_4, DIRECTIONS_8};
use crate::probability::{contiguous_probability, DEFAULT_FALLOFF_EXPONENT, DEFAULT_NOISE_AMOUNT};
use crate::rng::chance;

/// Hard cap on processed cells per fill.
pub const DEFAULT_MAX_CELLS: usize = 10_000;

/// Neighbourhood used when expanding from an accepted cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Connectivity {
    /// Orthogonal neighbours only.
    Four,
    /// Orthogonal and diagonal neighbours.
    #[default]
    Eight,
}

impl Connectivity {
    /// Offsets for this neighbourhood, orthogonal first.
    #[must_use]
    pub const fn directions(self) -> &'static [Point] {
        match self {
            Self::Four => &DIRECTIONS_4,
            Self::Eight => &DIRECTIONS_8,
        }
    }
}

/// Flood-fill parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloodFillConfig {
    /// Maximum graph distance from the center.
    pub radius: u32,
    /// Base acceptance density before falloff.
    pub density: f64,
    /// Exponent of the distance falloff.
    pub falloff_exponent: f64,
    /// Amplitude of uniform noise added per cell.
    pub noise_amount: f64,
    /// Neighbourhood used for expansion.
    pub connectivity: Connectivity,
    /// Processing cap.
    pub max_cells: usize,
}

impl Default for FloodFillConfig {
    fn default() -> Self {
        Self {
            radius: 3,
            density: 1.0,
            falloff_exponent: DEFAULT_FALLOFF_EXPONENT,
            noise_amount: DEFAULT_NOISE_AMOUNT,
            connectivity: Connectivity::Eight,
            max_cells: DEFAULT_MAX_CELLS,
        }
    }
}

impl FloodFillConfig {
    /// Config with the given radius and density and default falloff.
    #[must_use]
    pub fn new(radius: u32, density: f64) -> Self {
        Self {
            radius,
            density,
            ..Self::default()
        }
    }

    /// Set the falloff exponent.
    #[must_use]
    pub const fn with_falloff_exponent(mut self, falloff_exponent: f64) -> Self {
        self.falloff_exponent = falloff_exponent;
        self
    }

    /// Set the noise amplitude.
    #[must_use]
    pub const fn with_noise_amount(mut self, noise_amount: f64) -> Self {
        self.noise_amount = noise_amount;
        self
    }

    /// Set the expansion neighbourhood.
    #[must_use]
    pub const fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    /// Set the processing cap.
    #[must_use]
    pub const fn with_max_cells(mut self, max_cells: usize) -> Self {
        self.max_cells = max_cells;
        self
    }
}

/// Outcome of a fill.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloodFillResult {
    /// Cells written.
    pub cells_modified: usize,
    /// Cells dequeued and examined.
    pub cells_processed: usize,
    /// The processing cap stopped the fill early.
    pub hit_limit: bool,
    /// Written cells in acceptance order.
    pub modified_points: Vec<Point>,
}

/// Grow a cluster of `value` around `center` through `grid`.
///
/// Cells that are out of bounds or refused by [`GridAccess::can_modify`]
/// are counted as processed but never written and never expanded.
pub fn flood_fill<T, A, R>(
    grid: &mut A,
    center: Point,
    value: &T,
    config: &FloodFillConfig,
    rng: &mut R,
) -> FloodFillResult
where
    T: Clone,
    A: GridAccess<T> + ?Sized,
    R: Rng + ?Sized,
{
    let mut result = FloodFillResult::default();
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    let radius = f64::from(config.radius);

    visited.insert(center);
    queue.push_back((center, 0u32));

    while let Some((position, distance)) = queue.pop_front() {
        if result.cells_processed >= config.max_cells {
            result.hit_limit = true;
            break;
        }
        result.cells_processed += 1;

        if !grid.in_bounds(position) || !grid.can_modify(position) {
            continue;
        }

        let probability = contiguous_probability(
            rng,
            distance,
            radius,
            config.density,
            config.falloff_exponent,
            config.noise_amount,
        );
        if !chance(rng, probability) {
            continue;
        }

        grid.set_cell(position, value.clone());
        result.modified_points.push(position);
        result.cells_modified += 1;

        if distance < config.radius {
            for &direction in config.connectivity.directions() {
                let next = position.offset(direction);
                if visited.insert(next) {
                    queue.push_back((next, distance + 1));
                }
            }
        }
    }

    if result.hit_limit {
        trace!(
            x = center.x,
            y = center.y,
            processed = result.cells_processed,
            "flood fill stopped at processing cap"
        );
    }

    result
}

/// [`flood_fill`] over a concrete grid, writing only where `can_modify` holds.
pub fn flood_fill_grid<T, F, R>(
    grid: &mut Grid<T>,
    center: Point,
    value: &T,
    config: &FloodFillConfig,
    can_modify: F,
    rng: &mut R,
) -> FloodFillResult
where
    T: Clone,
    F: Fn(Point, &T) -> bool,
    R: Rng + ?Sized,
{
    let mut access = Guarded::new(grid, can_modify);
    flood_fill(&mut access, center, value, config, rng)
}
