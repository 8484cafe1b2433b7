//! Per-cell acceptance probabilities shared by the generators.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::math::clamp;
use crate::rng::random_in_range;

/// Default falloff exponent for contiguous growth.
pub const DEFAULT_FALLOFF_EXPONENT: f64 = 0.8;
/// Default noise amplitude for contiguous growth.
pub const DEFAULT_NOISE_AMOUNT: f64 = 0.1;
/// Default strength of radial blobs.
pub const DEFAULT_RADIAL_STRENGTH: f64 = 0.8;

/// Acceptance probability for a cell `distance` steps from a growth center.
///
/// The center (distance 0) is always accepted. Elsewhere the density decays as
/// `1 - (d / radius)^falloff_exponent`, plus uniform noise in
/// `±noise_amount / 2`, clamped to [0, 1].
pub fn contiguous_probability<R: Rng + ?Sized>(
    rng: &mut R,
    distance: u32,
    radius: f64,
    density: f64,
    falloff_exponent: f64,
    noise_amount: f64,
) -> f64 {
    if distance == 0 {
        return 1.0;
    }
    let normalized = f64::from(distance) / radius;
    let falloff = 1.0 - normalized.powf(falloff_exponent);
    let noise = random_in_range(rng, -noise_amount / 2.0, noise_amount / 2.0);
    clamp(density * falloff + noise, 0.0, 1.0)
}

/// One radial layer: probability grows with distance from center, or shrinks
/// when `invert_distance` is set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    /// Scale applied to the (possibly inverted) normalized distance.
    pub multiplier: f64,
    /// Use `1 - distance` instead of `distance`.
    pub invert_distance: bool,
    /// Floor under the computed probability.
    pub threshold: f64,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            multiplier: 0.0,
            invert_distance: false,
            threshold: 0.0,
        }
    }
}

impl LayerConfig {
    /// Layer with no threshold.
    #[must_use]
    pub const fn new(multiplier: f64, invert_distance: bool) -> Self {
        Self {
            multiplier,
            invert_distance,
            threshold: 0.0,
        }
    }
}

/// Probability for a single layer at `normalized_distance`, capped at 1.
#[must_use]
pub fn layer_probability(normalized_distance: f64, layer: &LayerConfig) -> f64 {
    let distance = if layer.invert_distance {
        1.0 - normalized_distance
    } else {
        normalized_distance
    };
    layer.threshold.max(distance * layer.multiplier).min(1.0)
}

/// Probabilities for several layers at the same distance, in layer order.
#[must_use]
pub fn multi_layer_probabilities(normalized_distance: f64, layers: &[LayerConfig]) -> Vec<f64> {
    layers
        .iter()
        .map(|layer| layer_probability(normalized_distance, layer))
        .collect()
}

/// Linear radial falloff: `max(0, 1 - distance / radius) * strength`. Zero for a zero radius.
#[must_use]
pub fn radial_probability(distance: f64, radius: f64, strength: f64) -> f64 {
    if radius == 0.0 {
        return 0.0;
    }
    (1.0 - distance / radius).max(0.0) * strength
}
