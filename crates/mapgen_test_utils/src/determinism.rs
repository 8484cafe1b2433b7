//! Determinism testing utilities.
//!
//! Provides a harness for verifying that map generation produces identical
//! output given identical inputs.
//!
//! # Testing Strategy
//!
//! A stored seed must reproduce its map exactly, both for replaying a
//! reported map and for regression tests that pin seeded output. Sources of
//! non-determinism include:
//!
//! - **System randomness**: generators only draw from the injected RNG.
//!   Never call `rand::thread_rng()` inside the pipeline.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Generation code iterates slices and `BTreeMap`s only.
//!
//! - **Thread scheduling**: generation runs on one thread per map. Parallel
//!   batches must not share an RNG.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual passes (layers, flood fill, placement)
//! 2. **Property tests**: Random sizes and seeds still reproduce
//! 3. **Integration tests**: Full pipeline output is stable
//! 4. **Parallel tests**: N generations on N threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use mapgen_core::config::MapGenConfig;
use mapgen_core::map::{generate_map, GeneratedMap, Map, MapSize};
use mapgen_core::math::Point;
use mapgen_core::rng::seeded_rng;
use mapgen_core::terrain::TerrainGrid;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
}

impl DeterminismResult {
    fn from_hashes(hashes: Vec<u64>) -> Self {
        Self {
            is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
            hashes,
        }
    }

    /// Get all unique hashes (should be 1 for deterministic generation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that generation was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Map generation is non-deterministic!\n\
                 Runs: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a generator multiple times and verify every run hashes the same.
///
/// # Arguments
///
/// * `runs` - Number of times to run the generator
/// * `generate` - Function producing the output under test
/// * `hash` - Function to compute an output hash
pub fn verify_determinism<S, Gen, HashFn>(runs: usize, generate: Gen, hash: HashFn) -> DeterminismResult
where
    Gen: Fn() -> S,
    HashFn: Fn(&S) -> u64,
{
    let hashes = (0..runs).map(|_| hash(&generate())).collect();
    DeterminismResult::from_hashes(hashes)
}

/// Generate the same map `runs` times from `seed` and compare hashes.
///
/// # Panics
///
/// Panics if generation itself fails.
pub fn verify_seed_determinism(
    size: MapSize,
    players: u32,
    config: &MapGenConfig,
    seed: u64,
    runs: usize,
) -> DeterminismResult {
    verify_determinism(
        runs,
        || generate_map(size, players, config, &mut seeded_rng(seed)).unwrap(),
        generated_hash,
    )
}

/// Generate the same map on `threads` scoped threads and compare hashes.
///
/// # Panics
///
/// Panics if generation fails or a thread panics.
pub fn run_parallel_generations(
    size: MapSize,
    players: u32,
    config: &MapGenConfig,
    seed: u64,
    threads: usize,
) -> DeterminismResult {
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                s.spawn(|| {
                    let generated = generate_map(size, players, config, &mut seeded_rng(seed)).unwrap();
                    generated_hash(&generated)
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    DeterminismResult::from_hashes(hashes)
}

/// First cell (row-major) where two grids differ.
///
/// Grids of different shape differ at the origin.
#[must_use]
pub fn find_first_difference(a: &TerrainGrid, b: &TerrainGrid) -> Option<Point> {
    if a.width() != b.width() || a.height() != b.height() {
        return Some(Point::ZERO);
    }
    a.iter().zip(b.iter()).find(|((_, x), (_, y))| x != y).map(|((p, _), _)| p)
}

/// Verify that a binary round trip preserves a map exactly.
#[must_use]
pub fn verify_serialization_determinism(map: &Map) -> bool {
    let Ok(bytes) = map.encode() else {
        return false;
    };
    match Map::decode(&bytes) {
        Ok(restored) => map_hash(&restored) == map_hash(map) && restored == *map,
        Err(_) => false,
    }
}

/// Hash of the generated terrain and spawns.
#[must_use]
pub fn generated_hash(generated: &GeneratedMap) -> u64 {
    compute_hash(&(&generated.terrain_data, &generated.spawn_points))
}

/// Hash of a map's size, terrain and spawns. The id is ignored.
#[must_use]
pub fn map_hash(map: &Map) -> u64 {
    compute_hash(&(map.size(), map.terrain_data(), map.spawn_points()))
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for generation testing.
pub mod strategies {
    use mapgen_core::map::MapSize;
    use mapgen_core::spawn::{SpawnLayout, MAX_PLAYERS};
    use proptest::prelude::*;

    /// Map sizes from 10x10 to 120x120.
    ///
    /// Kept small so property tests stay fast.
    pub fn arb_map_size() -> impl Strategy<Value = MapSize> {
        (10i64..=120, 10i64..=120).prop_map(|(x, y)| MapSize::try_new(x, y).unwrap())
    }

    /// Player counts the spawn layouts support.
    pub fn arb_players() -> impl Strategy<Value = u32> {
        0u32..=MAX_PLAYERS
    }

    /// Any seed.
    pub fn arb_seed() -> impl Strategy<Value = u64> {
        any::<u64>()
    }

    /// Either spawn layout.
    pub fn arb_spawn_layout() -> impl Strategy<Value = SpawnLayout> {
        prop_oneof![Just(SpawnLayout::Corners), Just(SpawnLayout::Ring)]
    }

    /// Cell coordinates, including some just off a `width` x `height` map.
    pub fn arb_cell(width: u32, height: u32) -> impl Strategy<Value = (i32, i32)> {
        (-2..width as i32 + 2, -2..height as i32 + 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{grid_from_rows, map_size};
    use mapgen_core::map::MapId;
    use proptest::prelude::*;

    #[test]
    fn test_seed_determinism() {
        let result = verify_seed_determinism(map_size(50, 40), 2, &MapGenConfig::default(), 7, 3);
        result.assert_deterministic();
        assert_eq!(result.unique_hashes().len(), 1);
    }

    #[test]
    fn test_different_seeds_differ() {
        let config = MapGenConfig::default();
        let a = generate_map(map_size(60, 60), 2, &config, &mut seeded_rng(1)).unwrap();
        let b = generate_map(map_size(60, 60), 2, &config, &mut seeded_rng(2)).unwrap();
        assert_ne!(generated_hash(&a), generated_hash(&b));
        assert!(find_first_difference(&a.terrain_data, &b.terrain_data).is_some());
    }

    #[test]
    fn test_parallel_generations_match() {
        let result = run_parallel_generations(map_size(64, 64), 4, &MapGenConfig::default(), 99, 4);
        result.assert_deterministic();
        assert_eq!(result.hashes.len(), 4);
    }

    #[test]
    fn test_find_first_difference() {
        let a = grid_from_rows(&["..", "#."]);
        let b = grid_from_rows(&["..", "#X"]);
        assert_eq!(find_first_difference(&a, &a), None);
        assert_eq!(find_first_difference(&a, &b), Some(Point::new(1, 1)));
        let c = grid_from_rows(&["..."]);
        assert_eq!(find_first_difference(&a, &c), Some(Point::ZERO));
    }

    #[test]
    fn test_serialization_round_trip() {
        let (map, _) = Map::generated(
            MapId::new(),
            map_size(30, 30),
            2,
            &MapGenConfig::default(),
            &mut seeded_rng(3),
        )
        .unwrap();
        assert!(verify_serialization_determinism(&map));
    }

    #[test]
    #[should_panic(expected = "non-deterministic")]
    fn test_assert_reports_divergence() {
        DeterminismResult::from_hashes(vec![1, 2]).assert_deterministic();
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_generation_reproduces(size in strategies::arb_map_size(), seed in strategies::arb_seed()) {
            let result = verify_seed_determinism(size, 1, &MapGenConfig::default(), seed, 2);
            prop_assert!(result.is_deterministic);
        }
    }
}
