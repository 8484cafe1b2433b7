//! Geometry and scalar math helpers for grid generation.
//!
//! Grid coordinates are signed so that neighbour expansion and line walking
//! can step off the map; bounds are checked at the point of use.

use serde::{Deserialize, Serialize};

/// Integer grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

/// Orthogonal neighbour offsets (left, right, up, down).
pub const DIRECTIONS_4: [Point; 4] = [
    Point::new(-1, 0),
    Point::new(1, 0),
    Point::new(0, -1),
    Point::new(0, 1),
];

/// Orthogonal then diagonal neighbour offsets.
pub const DIRECTIONS_8: [Point; 8] = [
    Point::new(-1, 0),
    Point::new(1, 0),
    Point::new(0, -1),
    Point::new(0, 1),
    Point::new(-1, -1),
    Point::new(1, -1),
    Point::new(-1, 1),
    Point::new(1, 1),
];

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Origin.
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Offset this point by another.
    #[must_use]
    pub const fn offset(self, delta: Self) -> Self {
        Self {
            x: self.x + delta.x,
            y: self.y + delta.y,
        }
    }

    /// Squared Euclidean distance (avoids sqrt for comparisons).
    #[must_use]
    pub fn distance_squared(self, other: Self) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        dx * dx + dy * dy
    }

    /// Euclidean distance.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.distance_squared(other) as f64).sqrt()
    }

    /// Manhattan distance.
    #[must_use]
    pub fn manhattan_distance(self, other: Self) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Chebyshev distance (largest axis difference).
    #[must_use]
    pub fn chebyshev_distance(self, other: Self) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// The four orthogonal neighbours.
    #[must_use]
    pub fn neighbors4(self) -> [Self; 4] {
        DIRECTIONS_4.map(|d| self.offset(d))
    }

    /// All eight neighbours.
    #[must_use]
    pub fn neighbors8(self) -> [Self; 8] {
        DIRECTIONS_8.map(|d| self.offset(d))
    }

    /// Orthogonal neighbours that fall inside a `width` x `height` area.
    #[must_use]
    pub fn bounded_neighbors4(self, width: u32, height: u32) -> Vec<Self> {
        self.neighbors4()
            .into_iter()
            .filter(|p| is_within_bounds(*p, width, height))
            .collect()
    }

    /// All neighbours that fall inside a `width` x `height` area.
    #[must_use]
    pub fn bounded_neighbors8(self, width: u32, height: u32) -> Vec<Self> {
        self.neighbors8()
            .into_iter()
            .filter(|p| is_within_bounds(*p, width, height))
            .collect()
    }
}

impl std::ops::Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self.offset(rhs)
    }
}

impl std::ops::Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

/// Euclidean distance between two real-valued coordinates.
#[must_use]
pub fn euclidean_distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    ((x1 - x2).powi(2) + (y1 - y2).powi(2)).sqrt()
}

/// Distance divided by `max_distance`, clamped to [0, 1]. Zero when `max_distance` is zero.
#[must_use]
pub fn normalized_distance(distance: f64, max_distance: f64) -> f64 {
    if max_distance == 0.0 {
        return 0.0;
    }
    clamp(distance / max_distance, 0.0, 1.0)
}

/// Center cell of a `width` x `height` area (integer halves, rounded down).
#[must_use]
pub const fn map_center(width: u32, height: u32) -> Point {
    Point::new((width / 2) as i32, (height / 2) as i32)
}

/// Distance from the center cell to the origin corner.
///
/// The center rounds down, so the origin corner is never closer than any
/// other corner and this is the farthest-corner distance.
#[must_use]
pub fn max_distance_from_center(width: u32, height: u32) -> f64 {
    map_center(width, height).distance(Point::ZERO)
}

/// Whether `point` lies inside `[0, width) x [0, height)`.
#[must_use]
pub fn is_within_bounds(point: Point, width: u32, height: u32) -> bool {
    point.x >= 0 && point.y >= 0 && (point.x as u32) < width && (point.y as u32) < height
}

/// Project `radius` along `angle` (radians) from `center`, flooring to a cell.
#[must_use]
pub fn polar_to_cartesian(center: Point, angle: f64, radius: f64) -> Point {
    Point::new(
        (f64::from(center.x) + angle.cos() * radius).floor() as i32,
        (f64::from(center.y) + angle.sin() * radius).floor() as i32,
    )
}

/// Rotate `point` around `center` by `angle` radians, flooring to a cell.
#[must_use]
pub fn rotate_point(point: Point, center: Point, angle: f64) -> Point {
    let (sin, cos) = angle.sin_cos();
    let dx = f64::from(point.x - center.x);
    let dy = f64::from(point.y - center.y);
    Point::new(
        (f64::from(center.x) + dx * cos - dy * sin).floor() as i32,
        (f64::from(center.y) + dx * sin + dy * cos).floor() as i32,
    )
}

/// Linear interpolation between two cells, flooring to a cell.
#[must_use]
pub fn lerp_point(start: Point, end: Point, t: f64) -> Point {
    Point::new(
        lerp(f64::from(start.x), f64::from(end.x), t).floor() as i32,
        lerp(f64::from(start.y), f64::from(end.y), t).floor() as i32,
    )
}

/// All cells on the line from `start` to `end` inclusive (Bresenham).
#[must_use]
pub fn line_points(start: Point, end: Point) -> Vec<Point> {
    let mut points = Vec::new();
    let (mut x0, mut y0) = (start.x, start.y);
    let dx = (end.x - x0).abs();
    let dy = (end.y - y0).abs();
    let sx = if x0 < end.x { 1 } else { -1 };
    let sy = if y0 < end.y { 1 } else { -1 };
    let mut err = dx - dy;

    loop {
        points.push(Point::new(x0, y0));
        if x0 == end.x && y0 == end.y {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }

    points
}

/// Closest point to `target`, if any.
#[must_use]
pub fn nearest(target: Point, points: &[Point]) -> Option<Point> {
    points
        .iter()
        .copied()
        .min_by_key(|p| p.distance_squared(target))
}

/// Mean position of `points`, floored. `None` for an empty slice.
#[must_use]
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as i64;
    let sum_x: i64 = points.iter().map(|p| i64::from(p.x)).sum();
    let sum_y: i64 = points.iter().map(|p| i64::from(p.y)).sum();
    Some(Point::new(
        sum_x.div_euclid(n) as i32,
        sum_y.div_euclid(n) as i32,
    ))
}

/// Smallest distance between any two points. `None` with fewer than two.
#[must_use]
pub fn min_pairwise_distance(points: &[Point]) -> Option<f64> {
    let mut best: Option<i64> = None;
    for (i, a) in points.iter().enumerate() {
        for b in &points[i + 1..] {
            let d = a.distance_squared(*b);
            best = Some(best.map_or(d, |current| current.min(d)));
        }
    }
    best.map(|d| (d as f64).sqrt())
}

/// Clamp `value` into `[min, max]`.
#[must_use]
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Linear interpolation.
#[must_use]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Hermite smoothstep between two edges.
#[must_use]
pub fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    let t = clamp((x - edge0) / (edge1 - edge0), 0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
