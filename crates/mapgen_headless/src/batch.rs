//! Batch map generation.
//!
//! Generates many maps across consecutive seeds in parallel using rayon and
//! collects per-map metrics.

use std::path::Path;
use std::time::Instant;

use mapgen_core::config::MapGenConfig;
use mapgen_core::map::{generate_map, Map, MapId, MapSize};
use mapgen_core::rng::seeded_rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::metrics::{BatchSummary, MapMetrics};
use crate::request::ValidatedRequest;

/// Configuration for a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Map size.
    pub size: MapSize,
    /// Players per map.
    pub players: u32,
    /// Number of maps to generate.
    pub map_count: u32,
    /// Maximum parallel generations (0 = use rayon default).
    pub parallel: u32,
    /// Seed of the first map. Map `i` uses `seed_start + i`.
    pub seed_start: u64,
    /// Generation settings.
    pub generation: MapGenConfig,
}

impl BatchConfig {
    /// Create config for a validated request.
    #[must_use]
    pub fn new(request: ValidatedRequest, map_count: u32) -> Self {
        Self {
            size: request.size,
            players: request.players,
            map_count,
            parallel: 0,
            seed_start: 0,
            generation: MapGenConfig::default(),
        }
    }

    /// Set seed start.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set parallelism.
    #[must_use]
    pub fn with_parallel(mut self, parallel: u32) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set generation settings.
    #[must_use]
    pub fn with_generation(mut self, generation: MapGenConfig) -> Self {
        self.generation = generation;
        self
    }
}

/// Error during batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchError {
    /// Map index.
    pub map_index: u32,
    /// Seed used.
    pub seed: u64,
    /// Error message.
    pub message: String,
}

/// Results from a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used.
    pub config: BatchConfig,
    /// Per-map metrics, in seed order.
    pub maps: Vec<MapMetrics>,
    /// Aggregate summary.
    pub summary: BatchSummary,
    /// Total runtime.
    pub duration_seconds: f64,
    /// Errors encountered.
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to JSON file.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

fn measure_one(config: &BatchConfig, index: u32) -> Result<MapMetrics, BatchError> {
    let seed = config.seed_start.wrapping_add(u64::from(index));
    let immediate = config.generation.terrain.spawn_clearance.immediate_radius;
    Map::generated(
        MapId::new(),
        config.size,
        config.players,
        &config.generation,
        &mut seeded_rng(seed),
    )
    .map(|(map, report)| MapMetrics::collect(&map, &report, seed, immediate))
    .map_err(|e| BatchError {
        map_index: index,
        seed,
        message: e.to_string(),
    })
}

/// Run a batch of generations.
pub fn run_batch(config: BatchConfig) -> BatchResults {
    let start = Instant::now();
    info!(
        maps = config.map_count,
        size = %config.size,
        players = config.players,
        seed_start = config.seed_start,
        "Starting batch run"
    );

    // Configure thread pool if specified
    if config.parallel > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel as usize)
            .build_global()
            .ok(); // Ignore if already set
    }

    let results: Vec<Result<MapMetrics, BatchError>> = (0..config.map_count)
        .into_par_iter()
        .map(|i| {
            let result = measure_one(&config, i);
            match &result {
                Ok(m) => debug!(index = i, seed = m.seed, coverage = m.resource_coverage, "map measured"),
                Err(e) => warn!(index = i, seed = e.seed, "map failed: {}", e.message),
            }
            result
        })
        .collect();

    let (maps, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let maps: Vec<MapMetrics> = maps.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(Result::err).collect();

    let summary = BatchSummary::from_maps(&maps);
    let duration_seconds = start.elapsed().as_secs_f64();
    info!(
        "Batch complete: {} maps in {:.1}s ({} failed)",
        maps.len(),
        duration_seconds,
        errors.len()
    );

    BatchResults {
        config,
        maps,
        summary,
        duration_seconds,
        errors,
    }
}

/// Generate the same seed `runs` times and check every output matches.
pub fn verify_determinism(size: MapSize, players: u32, config: &MapGenConfig, seed: u64, runs: u32) -> bool {
    let mut first = None;
    for run in 0..runs {
        let generated = match generate_map(size, players, config, &mut seeded_rng(seed)) {
            Ok(generated) => generated,
            Err(e) => {
                warn!(run, error = %e, "generation failed during verification");
                return false;
            }
        };
        match &first {
            None => first = Some(generated),
            Some(reference) if *reference != generated => {
                warn!(run, seed, "generation diverged");
                return false;
            }
            Some(_) => {}
        }
    }
    true
}
