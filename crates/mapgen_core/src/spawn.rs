//! Player spawn points.
//!
//! Two layouts are available. [`SpawnLayout::Corners`] seats players in the
//! map corners (diagonal pair first), then at edge midpoints.
//! [`SpawnLayout::Ring`] spaces players evenly on a circle around the center
//! with a little jitter.

use std::f64::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MapGenError, Result};
use crate::math::{is_within_bounds, map_center, Point};
use crate::rng::{random_angle, random_int_inclusive};

/// Most players any layout seats.
pub const MAX_PLAYERS: u32 = 8;

/// A player start cell. Coordinates are never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "SpawnPointRecord")]
pub struct SpawnPoint {
    x: i32,
    y: i32,
}

#[derive(Deserialize)]
struct SpawnPointRecord {
    x: i32,
    y: i32,
}

impl TryFrom<SpawnPointRecord> for SpawnPoint {
    type Error = MapGenError;

    fn try_from(record: SpawnPointRecord) -> Result<Self> {
        Self::try_new(i64::from(record.x), i64::from(record.y))
    }
}

impl SpawnPoint {
    /// Create a spawn point, rejecting negative coordinates.
    pub fn try_new(x: i64, y: i64) -> Result<Self> {
        match (i32::try_from(x), i32::try_from(y)) {
            (Ok(cx), Ok(cy)) if cx >= 0 && cy >= 0 => Ok(Self { x: cx, y: cy }),
            _ => Err(MapGenError::InvalidSpawnPoint { x, y }),
        }
    }

    /// Column.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// As a grid point.
    #[must_use]
    pub const fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl TryFrom<Point> for SpawnPoint {
    type Error = MapGenError;

    fn try_from(point: Point) -> Result<Self> {
        Self::try_new(i64::from(point.x), i64::from(point.y))
    }
}

/// Spawn arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SpawnLayout {
    /// Corners, then edge midpoints.
    #[default]
    Corners,
    /// Evenly spaced on a circle around the center.
    Ring,
}

/// Spawn generation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Arrangement.
    pub layout: SpawnLayout,
    /// Inset from the map edge. Shrinks on small maps.
    pub margin: u32,
    /// Ring radius as a fraction of the shorter map side.
    pub ring_radius_fraction: f64,
    /// Maximum per-axis ring jitter, in cells.
    pub ring_jitter: u32,
    /// Ring redraws before giving up on distinct points.
    pub ring_max_attempts: u32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            layout: SpawnLayout::Corners,
            margin: 10,
            ring_radius_fraction: 0.35,
            ring_jitter: 3,
            ring_max_attempts: 10,
        }
    }
}

impl SpawnConfig {
    /// Set the layout.
    #[must_use]
    pub const fn with_layout(mut self, layout: SpawnLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Set the edge margin.
    #[must_use]
    pub const fn with_margin(mut self, margin: u32) -> Self {
        self.margin = margin;
        self
    }
}

/// Inset and far coordinate along one axis.
///
/// The margin is capped at a quarter of the side so the near and far
/// positions stay distinct and on the map whenever the side allows it.
fn axis_extent(margin: u32, side: u32) -> (i32, i32) {
    let inset = margin.min((side / 4).max(1));
    let near = inset.min(side.saturating_sub(1));
    let far = side.saturating_sub(inset);
    (near as i32, far as i32)
}

fn corner_positions(width: u32, height: u32, margin: u32) -> Vec<Point> {
    let (left, right) = axis_extent(margin, width);
    let (top, bottom) = axis_extent(margin, height);
    let center = map_center(width, height);
    vec![
        Point::new(left, top),
        Point::new(right, top),
        Point::new(left, bottom),
        Point::new(right, bottom),
        Point::new(center.x, top),
        Point::new(center.x, bottom),
        Point::new(left, center.y),
        Point::new(right, center.y),
    ]
}

/// Corner layout: diagonal pair for two players, first corners for three
/// or four, then edge midpoints (top, bottom, left, right).
fn corner_layout(width: u32, height: u32, players: u32, margin: u32) -> Vec<Point> {
    let mut positions = corner_positions(width, height, margin);
    if players == 2 {
        return vec![positions[0], positions[3]];
    }
    positions.truncate(players as usize);
    positions
}

fn ring_layout<R: Rng + ?Sized>(
    width: u32,
    height: u32,
    players: u32,
    config: &SpawnConfig,
    rng: &mut R,
) -> Vec<Point> {
    let center = map_center(width, height);
    let radius = f64::from(width.min(height)) * config.ring_radius_fraction;
    let (min_x, max_x) = axis_extent(config.margin, width);
    let (min_y, max_y) = axis_extent(config.margin, height);
    let jitter = config.ring_jitter as i32;

    let mut best = Vec::new();
    for _ in 0..config.ring_max_attempts.max(1) {
        let start = random_angle(rng);
        let points: Vec<Point> = (0..players)
            .map(|i| {
                let angle = start + TAU * f64::from(i) / f64::from(players);
                let x = f64::from(center.x) + angle.cos() * radius;
                let y = f64::from(center.y) + angle.sin() * radius;
                let x = x.round() as i32 + random_int_inclusive(rng, -jitter, jitter);
                let y = y.round() as i32 + random_int_inclusive(rng, -jitter, jitter);
                Point::new(x.clamp(min_x, max_x.max(min_x)), y.clamp(min_y, max_y.max(min_y)))
            })
            .collect();
        let distinct = all_distinct(&points);
        best = points;
        if distinct {
            break;
        }
    }
    best
}

fn all_distinct(points: &[Point]) -> bool {
    points
        .iter()
        .enumerate()
        .all(|(i, p)| !points[i + 1..].contains(p))
}

/// Spawn points for `players` on a `width` x `height` map.
///
/// Zero players yields no spawns and one player spawns at the center for
/// every layout. Fails with [`MapGenError::PlayerCapacityExceeded`] when more
/// than [`MAX_PLAYERS`] are requested or the map is too small to seat them on
/// distinct cells.
pub fn calculate_spawn_points<R: Rng + ?Sized>(
    width: u32,
    height: u32,
    players: u32,
    config: &SpawnConfig,
    rng: &mut R,
) -> Result<Vec<SpawnPoint>> {
    if players > MAX_PLAYERS {
        return Err(MapGenError::PlayerCapacityExceeded {
            requested: players,
            capacity: MAX_PLAYERS,
        });
    }

    let positions = match players {
        0 => Vec::new(),
        1 => vec![map_center(width, height)],
        _ => match config.layout {
            SpawnLayout::Corners => corner_layout(width, height, players, config.margin),
            SpawnLayout::Ring => ring_layout(width, height, players, config, rng),
        },
    };

    let valid = positions
        .iter()
        .all(|p| is_within_bounds(*p, width, height))
        && all_distinct(&positions);
    if !valid {
        return Err(MapGenError::PlayerCapacityExceeded {
            requested: players,
            capacity: spawn_capacity(width, height, config),
        });
    }

    debug!(players, layout = ?config.layout, "spawn points calculated");
    positions.into_iter().map(SpawnPoint::try_from).collect()
}

/// Largest player count the corner layout seats on distinct cells.
#[must_use]
pub fn spawn_capacity(width: u32, height: u32, config: &SpawnConfig) -> u32 {
    if width == 0 || height == 0 {
        return 0;
    }
    let mut seated = 1;
    for players in 2..=MAX_PLAYERS {
        let positions = corner_layout(width, height, players, config.margin);
        let fits = positions.iter().all(|p| is_within_bounds(*p, width, height)) && all_distinct(&positions);
        if !fits {
            break;
        }
        seated = players;
    }
    seated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded_rng;

    fn corners(width: u32, height: u32, players: u32) -> Vec<Point> {
        calculate_spawn_points(width, height, players, &SpawnConfig::default(), &mut seeded_rng(0))
            .unwrap()
            .iter()
            .map(SpawnPoint::position)
            .collect()
    }

    #[test]
    fn test_spawn_point_rejects_negative() {
        assert!(SpawnPoint::try_new(0, 0).is_ok());
        assert_eq!(
            SpawnPoint::try_new(-1, 3),
            Err(MapGenError::InvalidSpawnPoint { x: -1, y: 3 })
        );
        assert!(serde_json::from_str::<SpawnPoint>(r#"{"x":2,"y":-4}"#).is_err());
        let p: SpawnPoint = serde_json::from_str(r#"{"x":2,"y":4}"#).unwrap();
        assert_eq!(serde_json::to_string(&p).unwrap(), r#"{"x":2,"y":4}"#);
    }

    #[test]
    fn test_zero_and_one_player() {
        assert!(corners(100, 100, 0).is_empty());
        assert_eq!(corners(10, 10, 1), vec![Point::new(5, 5)]);
        assert_eq!(corners(31, 17, 1), vec![Point::new(15, 8)]);
    }

    #[test]
    fn test_two_players_take_opposite_corners() {
        assert_eq!(corners(100, 100, 2), vec![Point::new(10, 10), Point::new(90, 90)]);
    }

    #[test]
    fn test_corner_order_and_edges() {
        let four = corners(100, 80, 4);
        assert_eq!(
            four,
            vec![
                Point::new(10, 10),
                Point::new(90, 10),
                Point::new(10, 70),
                Point::new(90, 70)
            ]
        );
        let eight = corners(100, 80, 8);
        assert_eq!(eight.len(), 8);
        assert_eq!(&eight[4..], &[
            Point::new(50, 10),
            Point::new(50, 70),
            Point::new(10, 40),
            Point::new(90, 40)
        ]);
        assert_eq!(corners(100, 80, 5)[4], Point::new(50, 10));
    }

    #[test]
    fn test_small_map_shrinks_margin() {
        let two = corners(10, 10, 2);
        assert_eq!(two, vec![Point::new(2, 2), Point::new(8, 8)]);
        assert_eq!(corners(10, 10, 8).len(), 8);
    }

    #[test]
    fn test_capacity_errors() {
        let mut rng = seeded_rng(1);
        let config = SpawnConfig::default();
        assert_eq!(
            calculate_spawn_points(100, 100, 9, &config, &mut rng),
            Err(MapGenError::PlayerCapacityExceeded {
                requested: 9,
                capacity: 8
            })
        );
        assert!(matches!(
            calculate_spawn_points(2, 2, 2, &config, &mut rng),
            Err(MapGenError::PlayerCapacityExceeded { requested: 2, .. })
        ));
        assert_eq!(spawn_capacity(2, 2, &config), 1);
        assert_eq!(spawn_capacity(100, 100, &config), 8);
    }

    #[test]
    fn test_ring_layout_spreads_players() {
        let config = SpawnConfig::default().with_layout(SpawnLayout::Ring);
        for seed in 0..10 {
            let spawns = calculate_spawn_points(120, 100, 6, &config, &mut seeded_rng(seed)).unwrap();
            assert_eq!(spawns.len(), 6);
            let center = Point::new(60, 50);
            for s in &spawns {
                let p = s.position();
                assert!(is_within_bounds(p, 120, 100));
                let d = p.distance(center);
                assert!((35.0 - 6.0..=35.0 + 6.0).contains(&d), "distance {d}");
            }
        }
    }

    #[test]
    fn test_ring_layout_is_reproducible() {
        let config = SpawnConfig::default().with_layout(SpawnLayout::Ring);
        let a = calculate_spawn_points(80, 80, 4, &config, &mut seeded_rng(3)).unwrap();
        let b = calculate_spawn_points(80, 80, 4, &config, &mut seeded_rng(3)).unwrap();
        assert_eq!(a, b);
    }
}
