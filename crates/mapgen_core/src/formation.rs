//! Linear and radial terrain formations plus clean-up passes.
//!
//! Linear formations are thick noisy lines (rock veins). Radial formations
//! are blobs whose fill probability falls off linearly from the center
//! (bedrock outcrops). Both write through [`GridAccess`] and respect its
//! `can_modify` predicate.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::grid::{Grid, GridAccess, Guarded};
use crate::math::Point;
use crate::probability::{radial_probability, DEFAULT_RADIAL_STRENGTH};
use crate::rng::{chance, random_angle, random_int_in_range, random_int_inclusive, random_position};

/// Parameters of linear formations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearFormationConfig {
    /// Formations per 1000 cells.
    pub density: f64,
    /// Shortest line, in steps.
    pub min_length: u32,
    /// Longest line, in steps.
    pub max_length: u32,
    /// Thinnest half-width.
    pub min_thickness: u32,
    /// Thickest half-width.
    pub max_thickness: u32,
    /// Amplitude of the per-step jitter.
    pub noise_amount: f64,
    /// Chance that an eligible cell is written.
    pub placement_probability: f64,
}

impl Default for LinearFormationConfig {
    fn default() -> Self {
        Self {
            density: 2.5,
            min_length: 5,
            max_length: 15,
            min_thickness: 1,
            max_thickness: 3,
            noise_amount: 1.0,
            placement_probability: 0.7,
        }
    }
}

/// Totals from a linear formation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearFormationResult {
    /// Formations that wrote at least one cell.
    pub formations_generated: u32,
    /// Cells written.
    pub elements_placed: u32,
    /// Cells considered.
    pub attempts: u32,
}

/// Number of linear formations for an area.
#[must_use]
pub fn linear_formation_count(width: u32, height: u32, density: f64) -> u32 {
    (f64::from(width) * f64::from(height) * density / 1000.0).floor() as u32
}

/// Draw noisy lines of `value` across a `width` x `height` area.
pub fn generate_linear_formations<T, A, R>(
    grid: &mut A,
    width: u32,
    height: u32,
    config: &LinearFormationConfig,
    value: &T,
    rng: &mut R,
) -> LinearFormationResult
where
    T: Clone,
    A: GridAccess<T> + ?Sized,
    R: Rng + ?Sized,
{
    let mut result = LinearFormationResult::default();
    let count = linear_formation_count(width, height, config.density);

    for _ in 0..count {
        let start = random_position(rng, width, height);
        let (sin, cos) = random_angle(rng).sin_cos();
        let length = random_int_inclusive(rng, config.min_length as i32, config.max_length as i32);
        let mut placed = 0u32;

        for step in 0..length {
            let step = f64::from(step);
            let on_line = Point::new(
                (f64::from(start.x) + cos * step).floor() as i32,
                (f64::from(start.y) + sin * step).floor() as i32,
            );
            if !grid.in_bounds(on_line) {
                continue;
            }

            let thickness = random_int_inclusive(
                rng,
                config.min_thickness as i32,
                config.max_thickness as i32,
            );
            let offset = Point::new(
                jitter(rng, config.noise_amount),
                jitter(rng, config.noise_amount),
            );

            for dy in -thickness..=thickness {
                for dx in -thickness..=thickness {
                    let position = on_line + Point::new(dx, dy) + offset;
                    result.attempts += 1;
                    if !grid.in_bounds(position) || !grid.can_modify(position) {
                        continue;
                    }
                    if !chance(rng, config.placement_probability) {
                        continue;
                    }
                    grid.set_cell(position, value.clone());
                    placed += 1;
                }
            }
        }

        if placed > 0 {
            result.formations_generated += 1;
            result.elements_placed += placed;
        }
    }

    result
}

fn jitter<R: Rng + ?Sized>(rng: &mut R, amount: f64) -> i32 {
    ((rng.gen::<f64>() - 0.5) * 2.0 * amount).floor() as i32
}

/// [`generate_linear_formations`] over a whole grid, writing only where `can_place` holds.
pub fn generate_linear_formations_on_grid<T, F, R>(
    grid: &mut Grid<T>,
    config: &LinearFormationConfig,
    value: &T,
    can_place: F,
    rng: &mut R,
) -> LinearFormationResult
where
    T: Clone,
    F: Fn(Point, &T) -> bool,
    R: Rng + ?Sized,
{
    let (width, height) = (grid.width(), grid.height());
    let mut access = Guarded::new(grid, can_place);
    generate_linear_formations(&mut access, width, height, config, value, rng)
}

/// Parameters of radial formations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadialFormationConfig {
    /// One formation per this many cells.
    pub density_divisor: u32,
    /// Smallest radius.
    pub min_radius: u32,
    /// Radii are drawn from `[min_radius, max_radius)`.
    pub max_radius: u32,
    /// Fill probability at the center.
    pub strength: f64,
}

impl Default for RadialFormationConfig {
    fn default() -> Self {
        Self {
            density_divisor: 800,
            min_radius: 2,
            max_radius: 6,
            strength: DEFAULT_RADIAL_STRENGTH,
        }
    }
}

impl RadialFormationConfig {
    /// Number of formations for an area. Zero when the divisor is zero.
    #[must_use]
    pub fn count(&self, width: u32, height: u32) -> u32 {
        if self.density_divisor == 0 {
            return 0;
        }
        let area = u64::from(width) * u64::from(height);
        (area / u64::from(self.density_divisor)) as u32
    }
}

/// Totals from a radial formation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadialFormationResult {
    /// Formations stamped.
    pub formations_generated: u32,
    /// Cells written.
    pub cells_placed: u32,
}

/// Stamp one blob of `value` around `center`.
///
/// Cells within `radius` are written with probability
/// [`radial_probability`]`(distance, radius, strength)`. Returns cells written.
pub fn stamp_radial_formation<T, A, R>(
    grid: &mut A,
    center: Point,
    radius: u32,
    strength: f64,
    value: &T,
    rng: &mut R,
) -> u32
where
    T: Clone,
    A: GridAccess<T> + ?Sized,
    R: Rng + ?Sized,
{
    let r = radius as i32;
    let mut placed = 0;
    for dy in -r..=r {
        for dx in -r..=r {
            let position = center + Point::new(dx, dy);
            if !grid.in_bounds(position) || !grid.can_modify(position) {
                continue;
            }
            let distance = position.distance(center);
            if distance > f64::from(radius) {
                continue;
            }
            if chance(rng, radial_probability(distance, f64::from(radius), strength)) {
                grid.set_cell(position, value.clone());
                placed += 1;
            }
        }
    }
    placed
}

/// Scatter radial formations of `value` over a `width` x `height` area.
pub fn generate_radial_formations<T, A, R>(
    grid: &mut A,
    width: u32,
    height: u32,
    config: &RadialFormationConfig,
    value: &T,
    rng: &mut R,
) -> RadialFormationResult
where
    T: Clone,
    A: GridAccess<T> + ?Sized,
    R: Rng + ?Sized,
{
    let mut result = RadialFormationResult::default();
    for _ in 0..config.count(width, height) {
        let center = random_position(rng, width, height);
        let radius = random_int_in_range(rng, config.min_radius as i32, config.max_radius as i32);
        result.cells_placed += stamp_radial_formation(grid, center, radius as u32, config.strength, value, rng);
        result.formations_generated += 1;
    }
    result
}

/// Replace `target` cells with fewer than `min_neighbors` matching 8-neighbours.
///
/// Decisions are taken on the grid as it was before the pass. Returns cells replaced.
pub fn smooth_formations<T>(grid: &mut Grid<T>, target: &T, replacement: &T, min_neighbors: usize) -> usize
where
    T: Clone + PartialEq,
{
    let (width, height) = (grid.width(), grid.height());
    let isolated: Vec<Point> = grid
        .iter()
        .filter(|(_, value)| *value == target)
        .filter(|(p, _)| {
            p.bounded_neighbors8(width, height)
                .into_iter()
                .filter(|n| grid.get(*n) == Some(target))
                .count()
                < min_neighbors
        })
        .map(|(p, _)| p)
        .collect();

    for &p in &isolated {
        grid.set(p, replacement.clone());
    }
    isolated.len()
}

/// Set every cell within Euclidean `radius` of `center` to `value`. Returns cells written.
pub fn clear_area<T: Clone>(grid: &mut Grid<T>, center: Point, radius: u32, value: &T) -> usize {
    let r = radius as i32;
    let mut cleared = 0;
    for dy in -r..=r {
        for dx in -r..=r {
            let position = center + Point::new(dx, dy);
            if position.distance(center) <= f64::from(radius) && grid.set(position, value.clone()) {
                cleared += 1;
            }
        }
    }
    cleared
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded_rng;

    #[test]
    fn test_linear_formation_count() {
        assert_eq!(linear_formation_count(100, 100, 2.5), 25);
        assert_eq!(linear_formation_count(10, 10, 2.5), 0);
        assert_eq!(linear_formation_count(20, 20, 2.5), 1);
    }

    #[test]
    fn test_linear_formations_respect_predicate() {
        let mut grid = Grid::create_with(60, 60, |x, _| if x < 30 { 0u8 } else { 2 });
        let mut rng = seeded_rng(1);
        let config = LinearFormationConfig::default();
        let result = generate_linear_formations_on_grid(&mut grid, &config, &1, |_, v| *v == 0, &mut rng);
        assert!(result.formations_generated > 0);
        assert!(result.attempts >= result.elements_placed);
        assert_eq!(grid.filter_positions(|v, x, _| *v == 1 && x >= 30).len(), 0);
        assert_eq!(grid.count_where(|v| *v == 2), 30 * 60);
    }

    #[test]
    fn test_certain_placement_fills_line_neighbourhood() {
        let mut grid = Grid::create_empty(40, 40, 0u8);
        let mut rng = seeded_rng(2);
        let config = LinearFormationConfig {
            density: 1.0,
            min_length: 8,
            max_length: 8,
            min_thickness: 1,
            max_thickness: 1,
            noise_amount: 0.0,
            placement_probability: 1.0,
        };
        let result = generate_linear_formations_on_grid(&mut grid, &config, &1, |_, _| true, &mut rng);
        assert_eq!(linear_formation_count(40, 40, 1.0), 1);
        assert_eq!(result.formations_generated, 1);
        let written = grid.count_where(|v| *v == 1);
        // the start cell is always on the map, so at least a corner of its square lands
        assert!(written >= 4);
        assert!(result.elements_placed as usize >= written);
    }

    #[test]
    fn test_radial_stamp_stays_in_radius() {
        let mut grid = Grid::create_empty(30, 30, 0u8);
        let mut rng = seeded_rng(3);
        let center = Point::new(15, 15);
        let placed = stamp_radial_formation(&mut grid, center, 5, 1.0, &1, &mut rng);
        assert_eq!(grid.count_where(|v| *v == 1) as u32, placed);
        assert_eq!(grid.get(center), Some(&1));
        for p in grid.filter_positions(|v, _, _| *v == 1) {
            assert!(p.distance(center) < 5.0);
        }
    }

    #[test]
    fn test_radial_formation_count() {
        let config = RadialFormationConfig::default();
        assert_eq!(config.count(100, 100), 12);
        assert_eq!(config.count(10, 10), 0);
        let none = RadialFormationConfig {
            density_divisor: 0,
            ..config
        };
        assert_eq!(none.count(100, 100), 0);
    }

    #[test]
    fn test_generate_radial_formations() {
        let mut grid = Grid::create_empty(100, 100, 0u8);
        let mut rng = seeded_rng(4);
        let result = generate_radial_formations(
            &mut grid,
            100,
            100,
            &RadialFormationConfig::default(),
            &1,
            &mut rng,
        );
        assert_eq!(result.formations_generated, 12);
        assert!(result.cells_placed > 0);
    }

    #[test]
    fn test_smooth_removes_isolated_cells() {
        let mut grid = Grid::from_rows(vec![
            vec![1, 0, 0, 0, 0],
            vec![0, 0, 0, 1, 1],
            vec![0, 0, 0, 1, 1],
        ])
        .unwrap();
        let replaced = smooth_formations(&mut grid, &1, &0, 2);
        assert_eq!(replaced, 1);
        assert_eq!(grid.get(Point::new(0, 0)), Some(&0));
        assert_eq!(grid.count_where(|v| *v == 1), 4);
    }

    #[test]
    fn test_clear_area_is_a_disc() {
        let mut grid = Grid::create_empty(9, 9, 1u8);
        let cleared = clear_area(&mut grid, Point::new(4, 4), 2, &0);
        assert_eq!(cleared, 13);
        assert_eq!(grid.get(Point::new(2, 2)), Some(&1));
        assert_eq!(grid.get(Point::new(2, 4)), Some(&0));
        let edge = clear_area(&mut grid, Point::new(0, 0), 1, &0);
        assert_eq!(edge, 3);
    }
}
