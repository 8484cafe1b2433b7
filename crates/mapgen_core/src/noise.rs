//! Noise fields used to break up regular generator output.

use noise::{NoiseFn, Perlin};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Cheap deterministic hash noise in `[0, 1)`.
///
/// Same inputs always give the same value; there is no seed.
#[must_use]
pub fn simple_noise(x: f64, y: f64, scale: f64) -> f64 {
    let n = ((x * scale) * 12.9898 + (y * scale) * 78.233).sin() * 43758.5453;
    n - n.floor()
}

/// Octave configuration for [`PerlinField`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OctaveConfig {
    /// Number of octaves summed.
    pub octaves: u32,
    /// Amplitude multiplier per octave.
    pub persistence: f64,
    /// Base frequency (coordinate scale) of the first octave.
    pub scale: f64,
}

impl Default for OctaveConfig {
    fn default() -> Self {
        Self {
            octaves: 4,
            persistence: 0.5,
            scale: 0.05,
        }
    }
}

/// Seeded gradient noise with octave summation.
#[derive(Debug, Clone)]
pub struct PerlinField {
    perlin: Perlin,
    config: OctaveConfig,
}

impl PerlinField {
    /// Build a field from an explicit seed.
    #[must_use]
    pub fn new(seed: u32, config: OctaveConfig) -> Self {
        Self {
            perlin: Perlin::new(seed),
            config,
        }
    }

    /// Build a field seeded from the injected generator.
    pub fn from_rng<R: Rng + ?Sized>(rng: &mut R, config: OctaveConfig) -> Self {
        Self::new(rng.gen(), config)
    }

    /// Single-octave sample, roughly in `[-1, 1]`.
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        self.perlin.get([x, y])
    }

    /// Octave sum normalised by total amplitude, roughly in `[-1, 1]`.
    #[must_use]
    pub fn octave(&self, x: f64, y: f64) -> f64 {
        let mut value = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = self.config.scale;
        let mut max_value = 0.0;

        for _ in 0..self.config.octaves.max(1) {
            value += self.perlin.get([x * frequency, y * frequency]) * amplitude;
            max_value += amplitude;
            amplitude *= self.config.persistence;
            frequency *= 2.0;
        }

        value / max_value
    }

    /// Octave sum remapped to `[0, 1]`.
    #[must_use]
    pub fn normalized(&self, x: f64, y: f64) -> f64 {
        ((self.octave(x, y) + 1.0) * 0.5).clamp(0.0, 1.0)
    }
}
