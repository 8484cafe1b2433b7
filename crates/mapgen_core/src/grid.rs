//! Generic 2D cell grid and the accessor trait the engines work through.
//!
//! [`Grid`] stores cells row-major and serializes as nested rows
//! (`grid[y][x]`), which is the shape consumers of the map artifact expect.
//!
//! The flood-fill, placement and formation engines never touch a concrete
//! grid. They go through [`GridAccess`], so the same algorithm can grow a
//! resource cluster on terrain or a test pattern on a `Grid<u8>`.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::math::{is_within_bounds, map_center, max_distance_from_center, normalized_distance, Point};

/// Capability interface over a mutable grid.
pub trait GridAccess<T> {
    /// Whether the position lies on the grid.
    fn in_bounds(&self, position: Point) -> bool;

    /// Whether the cell may be overwritten. Out-of-bounds cells never may.
    fn can_modify(&self, position: Point) -> bool;

    /// Write a cell. Out-of-bounds writes are ignored.
    fn set_cell(&mut self, position: Point, value: T);

    /// Read a cell, `None` when out of bounds.
    fn get_cell(&self, position: Point) -> Option<T>;
}

/// Row-major 2D grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid<T> {
    width: u32,
    height: u32,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Grid filled with `default_value`.
    #[must_use]
    pub fn create_empty(width: u32, height: u32, default_value: T) -> Self {
        Self {
            width,
            height,
            cells: vec![default_value; (width as usize) * (height as usize)],
        }
    }

    /// Grid filled by calling `initializer(x, y)` for every cell in row order.
    pub fn create_with<F>(width: u32, height: u32, mut initializer: F) -> Self
    where
        F: FnMut(u32, u32) -> T,
    {
        let mut cells = Vec::with_capacity((width as usize) * (height as usize));
        for y in 0..height {
            for x in 0..width {
                cells.push(initializer(x, y));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    /// Grid filled from the normalized distance to the map center.
    ///
    /// The distance is 0 at the center and 1 at the farthest corner.
    pub fn create_distance_based<F>(width: u32, height: u32, mut distance_fn: F) -> Self
    where
        F: FnMut(f64, u32, u32) -> T,
    {
        let center = map_center(width, height);
        let max_distance = max_distance_from_center(width, height);
        Self::create_with(width, height, |x, y| {
            let distance = Point::new(x as i32, y as i32).distance(center);
            distance_fn(normalized_distance(distance, max_distance), x, y)
        })
    }

    /// Grid filled by mapping a noise sample per cell.
    pub fn create_noise_based<N, M>(width: u32, height: u32, mut noise_fn: N, mut mapper: M) -> Self
    where
        N: FnMut(u32, u32) -> f64,
        M: FnMut(f64, u32, u32) -> T,
    {
        Self::create_with(width, height, |x, y| {
            let noise = noise_fn(x, y);
            mapper(noise, x, y)
        })
    }

    /// Build from nested rows. All rows must share the first row's length.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, String> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let mut cells = Vec::with_capacity(width * height);
        for (y, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(format!(
                    "row {y} has {} cells, expected {width}",
                    row.len()
                ));
            }
            cells.extend(row);
        }
        Ok(Self {
            width: width as u32,
            height: height as u32,
            cells,
        })
    }

    /// Copy out as nested rows.
    #[must_use]
    pub fn rows(&self) -> Vec<Vec<T>> {
        self.row_slices().map(<[T]>::to_vec).collect()
    }

    /// Value at `position`, or `default` when out of bounds.
    #[must_use]
    pub fn get_or(&self, position: Point, default: T) -> T {
        self.get(position).cloned().unwrap_or(default)
    }

    /// Write `value` at `position`. Returns false (and does nothing) when out of bounds.
    pub fn set(&mut self, position: Point, value: T) -> bool {
        match self.index_of(position) {
            Some(idx) => {
                self.cells[idx] = value;
                true
            }
            None => false,
        }
    }

    /// New grid with `transformer` applied to every cell.
    pub fn transform<U, F>(&self, mut transformer: F) -> Grid<U>
    where
        F: FnMut(&T, u32, u32) -> U,
    {
        let mut cells = Vec::with_capacity(self.cells.len());
        for (idx, value) in self.cells.iter().enumerate() {
            let (x, y) = self.coords_of(idx);
            cells.push(transformer(value, x, y));
        }
        Grid {
            width: self.width,
            height: self.height,
            cells,
        }
    }
}

impl<T> Grid<T> {
    /// Grid width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the grid has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether `position` lies on the grid.
    #[must_use]
    pub fn in_bounds(&self, position: Point) -> bool {
        is_within_bounds(position, self.width, self.height)
    }

    #[inline]
    fn index_of(&self, position: Point) -> Option<usize> {
        if self.in_bounds(position) {
            Some((position.y as usize) * (self.width as usize) + (position.x as usize))
        } else {
            None
        }
    }

    #[inline]
    fn coords_of(&self, idx: usize) -> (u32, u32) {
        let width = self.width as usize;
        ((idx % width) as u32, (idx / width) as u32)
    }

    /// Cell at `position`, `None` when out of bounds.
    #[must_use]
    pub fn get(&self, position: Point) -> Option<&T> {
        self.index_of(position).map(|idx| &self.cells[idx])
    }

    /// Mutable cell at `position`, `None` when out of bounds.
    pub fn get_mut(&mut self, position: Point) -> Option<&mut T> {
        self.index_of(position).map(move |idx| &mut self.cells[idx])
    }

    /// Rows as slices, top to bottom.
    pub fn row_slices(&self) -> impl Iterator<Item = &[T]> {
        // chunks(0) panics, and a zero-width grid has no rows worth yielding
        let width = (self.width as usize).max(1);
        self.cells.chunks(width)
    }

    /// Every cell with its position, in row order.
    pub fn iter(&self) -> impl Iterator<Item = (Point, &T)> {
        self.cells.iter().enumerate().map(move |(idx, value)| {
            let (x, y) = self.coords_of(idx);
            (Point::new(x as i32, y as i32), value)
        })
    }

    /// Positions of every cell matching `predicate`, in row order.
    pub fn filter_positions<F>(&self, mut predicate: F) -> Vec<Point>
    where
        F: FnMut(&T, u32, u32) -> bool,
    {
        self.iter()
            .filter(|(p, value)| predicate(value, p.x as u32, p.y as u32))
            .map(|(p, _)| p)
            .collect()
    }

    /// Number of cells matching `predicate`.
    pub fn count_where<F>(&self, mut predicate: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        self.cells.iter().filter(|value| predicate(value)).count()
    }
}

impl<T: Clone> GridAccess<T> for Grid<T> {
    fn in_bounds(&self, position: Point) -> bool {
        Grid::in_bounds(self, position)
    }

    fn can_modify(&self, position: Point) -> bool {
        Grid::in_bounds(self, position)
    }

    fn set_cell(&mut self, position: Point, value: T) {
        self.set(position, value);
    }

    fn get_cell(&self, position: Point) -> Option<T> {
        self.get(position).cloned()
    }
}

/// Grid accessor that only allows writes where `predicate(position, current)` holds.
pub struct Guarded<'a, T, F> {
    grid: &'a mut Grid<T>,
    predicate: F,
}

impl<'a, T, F> Guarded<'a, T, F>
where
    F: Fn(Point, &T) -> bool,
{
    /// Wrap `grid`, gating writes with `predicate`.
    pub fn new(grid: &'a mut Grid<T>, predicate: F) -> Self {
        Self { grid, predicate }
    }
}

impl<T, F> GridAccess<T> for Guarded<'_, T, F>
where
    T: Clone,
    F: Fn(Point, &T) -> bool,
{
    fn in_bounds(&self, position: Point) -> bool {
        self.grid.in_bounds(position)
    }

    fn can_modify(&self, position: Point) -> bool {
        self.grid
            .get(position)
            .is_some_and(|current| (self.predicate)(position, current))
    }

    fn set_cell(&mut self, position: Point, value: T) {
        self.grid.set(position, value);
    }

    fn get_cell(&self, position: Point) -> Option<T> {
        self.grid.get(position).cloned()
    }
}

impl<T: Serialize> Serialize for Grid<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.width == 0 || self.height == 0 {
            return serializer.collect_seq(std::iter::empty::<&[T]>());
        }
        serializer.collect_seq(self.row_slices())
    }
}

impl<'de, T> Deserialize<'de> for Grid<T>
where
    T: Deserialize<'de> + Clone,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let rows = Vec::<Vec<T>>::deserialize(deserializer)?;
        Grid::from_rows(rows).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_empty_shape() {
        let grid = Grid::create_empty(4, 3, 0u8);
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.len(), 12);
        assert_eq!(grid.rows().len(), 3);
        assert!(grid.rows().iter().all(|row| row.len() == 4));
    }

    #[test]
    fn test_create_with_is_row_major() {
        let grid = Grid::create_with(3, 2, |x, y| x + 10 * y);
        assert_eq!(grid.rows(), vec![vec![0, 1, 2], vec![10, 11, 12]]);
        assert_eq!(grid.get(Point::new(2, 1)), Some(&12));
    }

    #[test]
    fn test_distance_based_is_zero_at_center_and_one_at_corner() {
        let grid = Grid::create_distance_based(11, 11, |d, _, _| d);
        assert_eq!(grid.get(Point::new(5, 5)), Some(&0.0));
        let corner = *grid.get(Point::new(0, 0)).unwrap();
        assert!((corner - 1.0).abs() < 1e-12);
        assert!(grid.iter().all(|(_, d)| (0.0..=1.0).contains(d)));
    }

    #[test]
    fn test_noise_based_maps_samples() {
        let grid = Grid::create_noise_based(3, 3, |x, _| f64::from(x), |n, _, _| n > 1.0);
        assert_eq!(grid.filter_positions(|v, _, _| *v).len(), 3);
    }

    #[test]
    fn test_out_of_bounds_access() {
        let mut grid = Grid::create_empty(2, 2, 'a');
        assert_eq!(grid.get(Point::new(2, 0)), None);
        assert_eq!(grid.get_or(Point::new(-1, 0), 'z'), 'z');
        assert!(!grid.set(Point::new(0, 5), 'b'));
        assert!(grid.set(Point::new(1, 1), 'b'));
        assert_eq!(grid.get(Point::new(1, 1)), Some(&'b'));
    }

    #[test]
    fn test_transform_and_filter_do_not_mutate() {
        let grid = Grid::create_with(3, 3, |x, y| x * y);
        let doubled = grid.transform(|v, _, _| v * 2);
        assert_eq!(doubled.get(Point::new(2, 2)), Some(&8));
        assert_eq!(grid.get(Point::new(2, 2)), Some(&4));
        let positives = grid.filter_positions(|v, _, _| *v > 0);
        assert_eq!(
            positives,
            vec![
                Point::new(1, 1),
                Point::new(2, 1),
                Point::new(1, 2),
                Point::new(2, 2)
            ]
        );
        assert_eq!(grid.count_where(|v| *v == 0), 5);
    }

    #[test]
    fn test_from_rows_rejects_ragged_input() {
        assert!(Grid::from_rows(vec![vec![1, 2], vec![3]]).is_err());
        let grid = Grid::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
        assert_eq!(grid.get(Point::new(0, 1)), Some(&3));
    }

    #[test]
    fn test_serializes_as_nested_rows() {
        let grid = Grid::create_with(2, 2, |x, y| x + 2 * y);
        let json = serde_json::to_string(&grid).unwrap();
        assert_eq!(json, "[[0,1],[2,3]]");
        let back: Grid<u32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, grid);
        assert!(serde_json::from_str::<Grid<u32>>("[[0,1],[2]]").is_err());
    }

    #[test]
    fn test_guarded_accessor_blocks_writes() {
        let mut grid = Grid::create_with(3, 1, |x, _| x);
        let mut guarded = Guarded::new(&mut grid, |_, current: &u32| *current != 1);
        assert!(guarded.can_modify(Point::new(0, 0)));
        assert!(!guarded.can_modify(Point::new(1, 0)));
        assert!(!guarded.can_modify(Point::new(3, 0)));
        guarded.set_cell(Point::new(0, 0), 9);
        assert_eq!(guarded.get_cell(Point::new(0, 0)), Some(9));
    }
}
