//! Random source for map generation.
//!
//! Every generator takes `&mut R where R: Rng + ?Sized` instead of reaching
//! for a global generator. Production callers pass [`entropy_rng`], tests and
//! replays pass [`seeded_rng`] and get byte-identical maps back.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::math::{polar_to_cartesian, Point};

/// Concrete generator used by the pipeline.
pub type MapRng = ChaCha8Rng;

/// Deterministic generator for a seed.
#[must_use]
pub fn seeded_rng(seed: u64) -> MapRng {
    MapRng::seed_from_u64(seed)
}

/// Generator seeded from OS entropy.
#[must_use]
pub fn entropy_rng() -> MapRng {
    MapRng::from_entropy()
}

/// Fresh seed from OS entropy, for runs that should be reproducible later.
#[must_use]
pub fn random_seed() -> u64 {
    entropy_rng().gen()
}

/// Uniform real in `[min, max)`. Returns `min` for an empty or inverted range.
pub fn random_in_range<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    if max <= min {
        return min;
    }
    min + rng.gen::<f64>() * (max - min)
}

/// Uniform integer in `[min, max)`. Returns `min` for an empty or inverted range.
pub fn random_int_in_range<R: Rng + ?Sized>(rng: &mut R, min: i32, max: i32) -> i32 {
    if max <= min {
        return min;
    }
    rng.gen_range(min..max)
}

/// Uniform integer in `[min, max]`.
pub fn random_int_inclusive<R: Rng + ?Sized>(rng: &mut R, min: i32, max: i32) -> i32 {
    if max <= min {
        return min;
    }
    rng.gen_range(min..=max)
}

/// Bernoulli draw. Probabilities outside [0, 1] saturate rather than panic.
pub fn chance<R: Rng + ?Sized>(rng: &mut R, probability: f64) -> bool {
    rng.gen::<f64>() < probability
}

/// Uniform angle in `[0, 2π)`.
pub fn random_angle<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen::<f64>() * std::f64::consts::TAU
}

/// Uniform cell inside a `width` x `height` area.
pub fn random_position<R: Rng + ?Sized>(rng: &mut R, width: u32, height: u32) -> Point {
    Point::new(
        random_int_in_range(rng, 0, width as i32),
        random_int_in_range(rng, 0, height as i32),
    )
}

/// Random cell at most `radius` from `center` (uniform angle and radius).
pub fn random_position_in_circle<R: Rng + ?Sized>(rng: &mut R, center: Point, radius: f64) -> Point {
    let angle = random_angle(rng);
    let distance = random_in_range(rng, 0.0, radius);
    polar_to_cartesian(center, angle, distance)
}
