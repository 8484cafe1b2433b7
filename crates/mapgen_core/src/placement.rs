//! Rejection sampling of object positions inside an annulus.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::math::{polar_to_cartesian, Point};
use crate::rng::{random_angle, random_in_range};

/// Default separation multiplier between objects of different kinds.
pub const DEFAULT_DIFFERENT_TYPE_MULTIPLIER: f64 = 1.5;
/// Default inset from the map edge.
pub const DEFAULT_EDGE_MARGIN: i32 = 5;
/// Default attempt budget.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 200;

/// Annulus `[min_radius, max_radius)` around a center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementZone {
    /// Ring center.
    pub center: Point,
    /// Inner radius (inclusive).
    pub min_radius: f64,
    /// Outer radius (exclusive).
    pub max_radius: f64,
}

impl PlacementZone {
    /// Create a zone.
    #[must_use]
    pub const fn new(center: Point, min_radius: f64, max_radius: f64) -> Self {
        Self {
            center,
            min_radius,
            max_radius,
        }
    }
}

/// An object already on the map that new placements must keep clear of.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedObject<K> {
    /// Object position.
    pub position: Point,
    /// Kind tag compared for same/different spacing.
    pub kind: K,
    /// Footprint radius.
    pub radius: u32,
}

impl<K> PlacedObject<K> {
    /// Create a placed object.
    #[must_use]
    pub const fn new(position: Point, kind: K, radius: u32) -> Self {
        Self {
            position,
            kind,
            radius,
        }
    }
}

/// Disc that no placement may fall inside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExclusionZone {
    /// Disc center.
    pub center: Point,
    /// Disc radius. Points strictly closer than this are rejected.
    pub radius: f64,
}

impl ExclusionZone {
    /// Disc of `radius` around `center`.
    #[must_use]
    pub const fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }
}

/// One exclusion disc of `radius` per point.
#[must_use]
pub fn exclusion_zones(points: &[Point], radius: f64) -> Vec<ExclusionZone> {
    points
        .iter()
        .map(|&center| ExclusionZone::new(center, radius))
        .collect()
}

/// Parameters of a single placement search.
pub struct PlacementConfig<'a, K> {
    /// Where candidates are sampled.
    pub zone: PlacementZone,
    /// Kind of the object being placed.
    pub object_kind: K,
    /// Objects to keep clear of.
    pub existing_objects: &'a [PlacedObject<K>],
    /// Discs to avoid.
    pub exclusion_zones: &'a [ExclusionZone],
    /// Required separation from objects of the same kind.
    pub min_distance: f64,
    /// Separation from other kinds is `min_distance` times this.
    pub different_type_distance_multiplier: f64,
    /// Both `p - margin` and `p + margin` must be in bounds.
    pub edge_margin: i32,
    /// Attempt budget.
    pub max_attempts: u32,
    /// Extra caller check on each otherwise valid candidate.
    pub validate: Option<&'a dyn Fn(Point) -> bool>,
}

impl<'a, K> PlacementConfig<'a, K> {
    /// Search for `object_kind` in `zone` with default spacing rules and no obstacles.
    #[must_use]
    pub fn new(zone: PlacementZone, object_kind: K, min_distance: f64) -> Self {
        Self {
            zone,
            object_kind,
            existing_objects: &[],
            exclusion_zones: &[],
            min_distance,
            different_type_distance_multiplier: DEFAULT_DIFFERENT_TYPE_MULTIPLIER,
            edge_margin: DEFAULT_EDGE_MARGIN,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            validate: None,
        }
    }

    /// Objects to keep clear of.
    #[must_use]
    pub const fn with_existing(mut self, existing_objects: &'a [PlacedObject<K>]) -> Self {
        self.existing_objects = existing_objects;
        self
    }

    /// Discs to avoid.
    #[must_use]
    pub const fn with_exclusions(mut self, exclusion_zones: &'a [ExclusionZone]) -> Self {
        self.exclusion_zones = exclusion_zones;
        self
    }

    /// Cross-kind separation multiplier.
    #[must_use]
    pub const fn with_different_type_multiplier(mut self, multiplier: f64) -> Self {
        self.different_type_distance_multiplier = multiplier;
        self
    }

    /// Edge margin.
    #[must_use]
    pub const fn with_edge_margin(mut self, edge_margin: i32) -> Self {
        self.edge_margin = edge_margin;
        self
    }

    /// Attempt budget.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Extra per-candidate check.
    #[must_use]
    pub fn with_validation(mut self, validate: &'a dyn Fn(Point) -> bool) -> Self {
        self.validate = Some(validate);
        self
    }
}

/// Outcome of a placement search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementResult {
    /// Accepted position, `None` when the budget ran out.
    pub position: Option<Point>,
    /// Candidates sampled.
    pub attempts: u32,
}

impl PlacementResult {
    /// Whether a position was found.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.position.is_some()
    }
}

/// Sample candidates until one passes every check or the budget is spent.
///
/// `in_bounds` is usually [`crate::grid::GridAccess::in_bounds`] of the target grid.
pub fn find_valid_position<K, B, R>(config: &PlacementConfig<'_, K>, in_bounds: B, rng: &mut R) -> PlacementResult
where
    K: PartialEq,
    B: Fn(Point) -> bool,
    R: Rng + ?Sized,
{
    let zone = &config.zone;
    let margin = Point::new(config.edge_margin, config.edge_margin);

    for attempt in 0..config.max_attempts {
        let angle = random_angle(rng);
        let distance = random_in_range(rng, zone.min_radius, zone.max_radius);
        let candidate = polar_to_cartesian(zone.center, angle, distance);

        if !in_bounds(candidate) || !in_bounds(candidate - margin) || !in_bounds(candidate + margin) {
            continue;
        }

        let excluded = config
            .exclusion_zones
            .iter()
            .any(|zone| candidate.distance(zone.center) < zone.radius);
        if excluded {
            continue;
        }

        let conflict = config.existing_objects.iter().any(|object| {
            let required = if object.kind == config.object_kind {
                config.min_distance
            } else {
                config.min_distance * config.different_type_distance_multiplier
            };
            candidate.distance(object.position) < required
        });
        if conflict {
            continue;
        }

        if let Some(validate) = config.validate {
            if !validate(candidate) {
                continue;
            }
        }

        return PlacementResult {
            position: Some(candidate),
            attempts: attempt + 1,
        };
    }

    PlacementResult {
        position: None,
        attempts: config.max_attempts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::is_within_bounds;
    use crate::rng::seeded_rng;

    fn bounds(width: u32, height: u32) -> impl Fn(Point) -> bool {
        move |p| is_within_bounds(p, width, height)
    }

    #[test]
    fn test_candidate_lands_in_annulus() {
        let mut rng = seeded_rng(1);
        let zone = PlacementZone::new(Point::new(50, 50), 10.0, 20.0);
        for _ in 0..50 {
            let config = PlacementConfig::new(zone, "gold", 5.0);
            let result = find_valid_position(&config, bounds(100, 100), &mut rng);
            let p = result.position.unwrap();
            // flooring can move a candidate up to one diagonal cell
            let d = p.distance(zone.center);
            assert!(d >= 10.0 - 1.5 && d < 20.0 + 1.5);
        }
    }

    #[test]
    fn test_exclusion_covering_annulus_exhausts_budget() {
        let mut rng = seeded_rng(2);
        let zone = PlacementZone::new(Point::new(50, 50), 5.0, 15.0);
        let exclusions = [ExclusionZone {
            center: Point::new(50, 50),
            radius: 30.0,
        }];
        let config = PlacementConfig::new(zone, "gold", 5.0)
            .with_exclusions(&exclusions)
            .with_max_attempts(37);
        let result = find_valid_position(&config, bounds(100, 100), &mut rng);
        assert!(!result.success());
        assert_eq!(result.position, None);
        assert_eq!(result.attempts, 37);
    }

    #[test]
    fn test_edge_margin_rejects_border_candidates() {
        let mut rng = seeded_rng(3);
        let zone = PlacementZone::new(Point::new(0, 0), 0.0, 3.0);
        let config = PlacementConfig::new(zone, 1u8, 1.0).with_edge_margin(5);
        let result = find_valid_position(&config, bounds(50, 50), &mut rng);
        assert!(!result.success());
        assert_eq!(result.attempts, DEFAULT_MAX_ATTEMPTS);
    }

    #[test]
    fn test_spacing_respects_kinds() {
        let mut rng = seeded_rng(4);
        let zone = PlacementZone::new(Point::new(50, 50), 0.0, 45.0);
        let mut placed: Vec<PlacedObject<&str>> = Vec::new();
        for i in 0..30 {
            let kind = if i % 2 == 0 { "gold" } else { "iron" };
            let config = PlacementConfig::new(zone, kind, 6.0)
                .with_existing(&placed)
                .with_different_type_multiplier(2.0);
            if let Some(p) = find_valid_position(&config, bounds(100, 100), &mut rng).position {
                placed.push(PlacedObject::new(p, kind, 2));
            }
        }
        assert!(placed.len() > 5);
        for (i, a) in placed.iter().enumerate() {
            for b in &placed[i + 1..] {
                let required = if a.kind == b.kind { 6.0 } else { 12.0 };
                assert!(a.position.distance(b.position) >= required);
            }
        }
    }

    #[test]
    fn test_custom_validation_is_applied() {
        let mut rng = seeded_rng(5);
        let zone = PlacementZone::new(Point::new(30, 30), 0.0, 10.0);
        let left_half = |p: Point| p.x < 30;
        let config = PlacementConfig::new(zone, (), 1.0).with_validation(&left_half);
        for _ in 0..20 {
            let p = find_valid_position(&config, bounds(60, 60), &mut rng).position.unwrap();
            assert!(p.x < 30);
        }
    }

    #[test]
    fn test_exclusion_zones_helper() {
        let zones = exclusion_zones(&[Point::new(1, 2), Point::new(3, 4)], 12.0);
        assert_eq!(zones.len(), 2);
        assert_eq!(zones[1].center, Point::new(3, 4));
        assert!(zones.iter().all(|z| z.radius == 12.0));
    }
}
