//! Generation configuration, loadable from RON.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```text
//! (
//!     resources: (base_resource_density: 0.03),
//!     spawns: (layout: Ring),
//! )
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MapGenError, Result};
use crate::formation::{LinearFormationConfig, RadialFormationConfig};
use crate::resources::{ClusterConfig, ResourceConfig};
use crate::spawn::{SpawnConfig, SpawnLayout};
use crate::terrain::TerrainConfig;

/// Complete map generation configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapGenConfig {
    /// Terrain pipeline.
    pub terrain: TerrainConfig,
    /// Resource deposits.
    pub resources: ResourceConfig,
    /// Spawn points.
    pub spawns: SpawnConfig,
}

impl MapGenConfig {
    /// Load and validate a config from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| MapGenError::ConfigLoad {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: Self = ron::from_str(&contents).map_err(|e| MapGenError::ConfigLoad {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a config from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let config: Self = ron::from_str(ron).map_err(|e| MapGenError::ConfigLoad {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty RON.
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| MapGenError::Encoding(format!("Failed to serialize config: {e}")))
    }

    /// Use the given spawn layout.
    #[must_use]
    pub fn with_spawn_layout(mut self, layout: SpawnLayout) -> Self {
        self.spawns.layout = layout;
        self
    }

    /// Reject ranges and probabilities that cannot produce a sensible map.
    pub fn validate(&self) -> Result<()> {
        validate_terrain(&self.terrain)?;
        validate_resources(&self.resources)?;
        validate_spawns(&self.spawns)
    }
}

fn ensure(condition: bool, message: impl FnOnce() -> String) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(MapGenError::InvalidConfig(message()))
    }
}

fn unit(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

fn validate_terrain(terrain: &TerrainConfig) -> Result<()> {
    for (name, layer) in [("rock_layer", terrain.rock_layer), ("bedrock_layer", terrain.bedrock_layer)] {
        ensure(layer.multiplier >= 0.0, || format!("terrain.{name}.multiplier must not be negative"))?;
        ensure(unit(layer.threshold), || format!("terrain.{name}.threshold must be in [0, 1]"))?;
    }
    ensure(unit(terrain.layer_noise), || "terrain.layer_noise must be in [0, 1]".to_string())?;
    ensure(terrain.layer_noise_octaves.scale > 0.0, || {
        "terrain.layer_noise_octaves.scale must be positive".to_string()
    })?;
    validate_radial(&terrain.bedrock_formations)?;
    validate_linear(&terrain.rock_veins)?;
    let clearance = terrain.spawn_clearance;
    ensure(clearance.immediate_radius <= clearance.clear_radius, || {
        format!(
            "terrain.spawn_clearance.immediate_radius ({}) exceeds clear_radius ({})",
            clearance.immediate_radius, clearance.clear_radius
        )
    })
}

fn validate_radial(formations: &RadialFormationConfig) -> Result<()> {
    ensure(formations.density_divisor > 0, || {
        "terrain.bedrock_formations.density_divisor must be positive".to_string()
    })?;
    ensure(formations.min_radius <= formations.max_radius, || {
        format!(
            "terrain.bedrock_formations radius range {}..{} is inverted",
            formations.min_radius, formations.max_radius
        )
    })?;
    ensure(unit(formations.strength), || {
        "terrain.bedrock_formations.strength must be in [0, 1]".to_string()
    })
}

fn validate_linear(veins: &LinearFormationConfig) -> Result<()> {
    ensure(veins.density >= 0.0, || "terrain.rock_veins.density must not be negative".to_string())?;
    ensure(veins.min_length <= veins.max_length, || {
        format!(
            "terrain.rock_veins length range {}..={} is inverted",
            veins.min_length, veins.max_length
        )
    })?;
    ensure(veins.min_thickness <= veins.max_thickness, || {
        format!(
            "terrain.rock_veins thickness range {}..={} is inverted",
            veins.min_thickness, veins.max_thickness
        )
    })?;
    ensure(veins.noise_amount >= 0.0, || {
        "terrain.rock_veins.noise_amount must not be negative".to_string()
    })?;
    ensure(unit(veins.placement_probability), || {
        "terrain.rock_veins.placement_probability must be in [0, 1]".to_string()
    })
}

fn validate_cluster(name: &str, cluster: &ClusterConfig) -> Result<()> {
    ensure(cluster.min_radius <= cluster.max_radius, || {
        format!(
            "{name} radius range {}..={} is inverted",
            cluster.min_radius, cluster.max_radius
        )
    })?;
    ensure(unit(cluster.density), || format!("{name}.density must be in [0, 1]"))
}

fn validate_resources(resources: &ResourceConfig) -> Result<()> {
    ensure(resources.base_resource_density >= 0.0, || {
        "resources.base_resource_density must not be negative".to_string()
    })?;
    ensure(resources.player_multiplier > 0.0, || {
        "resources.player_multiplier must be positive".to_string()
    })?;
    for (name, fraction) in [
        ("crystal_fraction", resources.crystal_fraction),
        ("iron_fraction", resources.iron_fraction),
        ("gold_central_fraction", resources.gold_central_fraction),
        ("outer_zone_min_percent", resources.outer_zone_min_percent),
    ] {
        ensure(unit(fraction), || format!("resources.{name} must be in [0, 1]"))?;
    }
    ensure(
        0.0 <= resources.central_zone_radius_percent
            && resources.central_zone_radius_percent <= resources.middle_zone_radius_percent
            && resources.middle_zone_radius_percent <= 1.0,
        || {
            format!(
                "resource zones must satisfy 0 <= central ({}) <= middle ({}) <= 1",
                resources.central_zone_radius_percent, resources.middle_zone_radius_percent
            )
        },
    )?;

    let clusters = &resources.clusters;
    validate_cluster("resources.clusters.crystal_central", &clusters.crystal_central)?;
    validate_cluster("resources.clusters.gold_central", &clusters.gold_central)?;
    validate_cluster("resources.clusters.gold_middle", &clusters.gold_middle)?;
    validate_cluster("resources.clusters.iron_outer", &clusters.iron_outer)?;

    let spacing = &resources.spacing;
    ensure(spacing.min_distance_from_same_type > 0.0, || {
        "resources.spacing.min_distance_from_same_type must be positive".to_string()
    })?;
    ensure(spacing.min_distance_from_other_types >= 0.0, || {
        "resources.spacing.min_distance_from_other_types must not be negative".to_string()
    })?;
    ensure(spacing.exclusion_radius_from_spawns >= 0.0, || {
        "resources.spacing.exclusion_radius_from_spawns must not be negative".to_string()
    })?;
    ensure(spacing.edge_margin >= 0, || {
        "resources.spacing.edge_margin must not be negative".to_string()
    })?;
    ensure(spacing.max_attempts > 0, || {
        "resources.spacing.max_attempts must be positive".to_string()
    })?;

    let spawn = &resources.spawn_resources;
    ensure(
        0.0 <= spawn.min_distance && spawn.min_distance <= spawn.max_distance,
        || {
            format!(
                "resources.spawn_resources distance band {}..{} is invalid",
                spawn.min_distance, spawn.max_distance
            )
        },
    )?;
    validate_cluster("resources.spawn_resources.cluster", &spawn.cluster)
}

fn validate_spawns(spawns: &SpawnConfig) -> Result<()> {
    ensure(
        spawns.ring_radius_fraction > 0.0 && spawns.ring_radius_fraction <= 0.5,
        || "spawns.ring_radius_fraction must be in (0, 0.5]".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(MapGenConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_ron_keeps_defaults() {
        let config = MapGenConfig::from_ron_str(
            "(resources: (base_resource_density: 0.03), spawns: (layout: Ring))",
        )
        .unwrap();
        assert_eq!(config.resources.base_resource_density, 0.03);
        assert_eq!(config.resources.player_multiplier, 1.3);
        assert_eq!(config.spawns.layout, SpawnLayout::Ring);
        assert_eq!(config.terrain, TerrainConfig::default());
    }

    #[test]
    fn test_ron_round_trip() {
        let config = MapGenConfig::default().with_spawn_layout(SpawnLayout::Ring);
        let text = config.to_ron_string().unwrap();
        assert_eq!(MapGenConfig::from_ron_str(&text).unwrap(), config);
    }

    #[test]
    fn test_rejects_inverted_clearance() {
        let mut config = MapGenConfig::default();
        config.terrain = config.terrain.with_spawn_clearance(5, 3);
        assert!(matches!(config.validate(), Err(MapGenError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_out_of_order_zones() {
        let mut config = MapGenConfig::default();
        config.resources.central_zone_radius_percent = 0.8;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("central"));
    }

    #[test]
    fn test_rejects_bad_probability() {
        let mut config = MapGenConfig::default();
        config.terrain.rock_veins.placement_probability = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_layer_noise_above_one() {
        let mut config = MapGenConfig::default();
        config.terrain = config.terrain.with_layer_noise(1.5);
        assert!(matches!(config.validate(), Err(MapGenError::InvalidConfig(_))));
        config.terrain = config.terrain.with_layer_noise(0.2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_error_is_config_load() {
        assert!(matches!(
            MapGenConfig::from_ron_str("(terrain: 5)"),
            Err(MapGenError::ConfigLoad { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_config_load() {
        let err = MapGenConfig::load("/definitely/not/here.ron").unwrap_err();
        assert!(matches!(err, MapGenError::ConfigLoad { ref path, .. } if path.contains("here.ron")));
    }
}
