//! Headless map generator.
//!
//! Generates, renders and checks maps without a game client.
//!
//! # Usage
//!
//! ```bash
//! # Generate a 2-player map and write it as JSON
//! cargo run -p mapgen_headless -- generate --width 100 --height 100 --players 2 --output maps/map.json
//!
//! # Print a seeded map as ASCII
//! cargo run -p mapgen_headless -- generate --seed 42 --ascii
//!
//! # Render a stored map
//! cargo run -p mapgen_headless -- render --input maps/map.json
//!
//! # Verify determinism
//! cargo run -p mapgen_headless -- verify --seed 12345 --runs 5
//!
//! # Measure 100 seeds
//! cargo run -p mapgen_headless -- batch --count 100 --output results/batch.json
//! ```
//!
//! Map output goes to stdout, logs go to stderr.

use std::path::PathBuf;
use std::process;
use std::sync::mpsc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mapgen_core::config::MapGenConfig;
use mapgen_core::map::SessionId;
use mapgen_core::rng::random_seed;
use mapgen_headless::{
    ascii::{render_map, AsciiConfig},
    batch::{run_batch, verify_determinism, BatchConfig},
    load_map,
    request::{GenerationRequest, ValidatedRequest},
    worker::{spawn_generation, GenerationJob},
};

#[derive(Parser)]
#[command(name = "mapgen_headless")]
#[command(about = "Headless procedural map generator")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// RON generation config (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a single map
    Generate {
        /// Map width in cells
        #[arg(long, default_value = "100")]
        width: i64,

        /// Map height in cells
        #[arg(long, default_value = "100")]
        height: i64,

        /// Number of players
        #[arg(short, long, default_value = "2")]
        players: u32,

        /// Random seed (random when omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Write the map here (.json or .bin)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the map as ASCII instead of JSON
        #[arg(long)]
        ascii: bool,

        /// Disable colored ASCII output
        #[arg(long)]
        no_color: bool,

        /// Give up after this many seconds
        #[arg(long, default_value = "60")]
        timeout_secs: u64,
    },

    /// Render a stored map as ASCII
    Render {
        /// Map file (.json or .bin)
        #[arg(short, long)]
        input: PathBuf,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Hide the legend
        #[arg(long)]
        no_legend: bool,
    },

    /// Verify determinism by generating the same seed multiple times
    Verify {
        /// Map width in cells
        #[arg(long, default_value = "100")]
        width: i64,

        /// Map height in cells
        #[arg(long, default_value = "100")]
        height: i64,

        /// Number of players
        #[arg(short, long, default_value = "2")]
        players: u32,

        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },

    /// Generate many seeds and summarize map metrics
    Batch {
        /// Map width in cells
        #[arg(long, default_value = "100")]
        width: i64,

        /// Map height in cells
        #[arg(long, default_value = "100")]
        height: i64,

        /// Number of players
        #[arg(short, long, default_value = "2")]
        players: u32,

        /// Number of maps
        #[arg(long, default_value = "100")]
        count: u32,

        /// Maximum parallel generations (0 = auto)
        #[arg(long, default_value = "0")]
        parallel: u32,

        /// Starting seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Results JSON path
        #[arg(short, long, default_value = "results/batch.json")]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for map output)
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(log_level))
        .init();

    let config = load_config(cli.config);

    match cli.command {
        Commands::Generate {
            width,
            height,
            players,
            seed,
            output,
            ascii,
            no_color,
            timeout_secs,
        } => {
            let request = validate(&config, width, height, players);
            cmd_generate(config, request, seed, output, ascii, no_color, timeout_secs);
        }
        Commands::Render {
            input,
            no_color,
            no_legend,
        } => {
            cmd_render(input, no_color, no_legend);
        }
        Commands::Verify {
            width,
            height,
            players,
            seed,
            runs,
        } => {
            let request = validate(&config, width, height, players);
            cmd_verify(&config, request, seed, runs);
        }
        Commands::Batch {
            width,
            height,
            players,
            count,
            parallel,
            seed,
            output,
        } => {
            let request = validate(&config, width, height, players);
            cmd_batch(config, request, count, parallel, seed, output);
        }
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    tracing::error!("{message}");
    eprintln!("FATAL: {message}");
    process::exit(1);
}

fn load_config(path: Option<PathBuf>) -> MapGenConfig {
    match path {
        Some(path) => match MapGenConfig::load(&path) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "Loaded generation config");
                config
            }
            Err(e) => fail(e),
        },
        None => MapGenConfig::default(),
    }
}

fn validate(config: &MapGenConfig, width: i64, height: i64, players: u32) -> ValidatedRequest {
    GenerationRequest::new(width, height, players)
        .validate(&config.spawns)
        .unwrap_or_else(|e| fail(e))
}

/// Generate one map on a worker thread
fn cmd_generate(
    config: MapGenConfig,
    request: ValidatedRequest,
    seed: Option<u64>,
    output: Option<PathBuf>,
    ascii: bool,
    no_color: bool,
    timeout_secs: u64,
) {
    let seed = seed.unwrap_or_else(random_seed);
    let session_id = SessionId::new();
    tracing::info!(
        session = %session_id,
        size = %request.size,
        players = request.players,
        seed,
        "Generating map"
    );

    let mut job = GenerationJob::new(session_id, request, seed).with_config(config);
    if let Some(path) = output.clone() {
        job = job.with_output(path);
    }

    let (events_tx, events_rx) = mpsc::channel();
    let map = spawn_generation(job, Some(events_tx))
        .and_then(|handle| handle.wait(Duration::from_secs(timeout_secs)))
        .unwrap_or_else(|e| fail(e));

    if let Ok(event) = events_rx.try_recv() {
        tracing::info!(session = %event.session_id, map = %event.map_id, "Map generated");
    }

    if ascii {
        let ascii_config = AsciiConfig {
            use_color: !no_color,
            ..AsciiConfig::default()
        };
        print!("{}", render_map(&map, &ascii_config));
    } else if output.is_none() {
        match map.to_json_pretty() {
            Ok(json) => println!("{json}"),
            Err(e) => fail(e),
        }
    }
}

/// Render a stored map
fn cmd_render(input: PathBuf, no_color: bool, no_legend: bool) {
    let map = load_map(&input).unwrap_or_else(|e| fail(e));
    let config = AsciiConfig {
        use_color: !no_color,
        show_legend: !no_legend,
        ..AsciiConfig::default()
    };
    println!("Map {} ({})", map.id(), map.size());
    print!("{}", render_map(&map, &config));
}

/// Verify determinism
fn cmd_verify(config: &MapGenConfig, request: ValidatedRequest, seed: u64, runs: u32) {
    tracing::info!(seed, runs, size = %request.size, "Verifying determinism");

    if verify_determinism(request.size, request.players, config, seed, runs) {
        eprintln!("PASS: {runs} runs of seed {seed} produced identical maps");
    } else {
        eprintln!("FAIL: seed {seed} produced different maps");
        process::exit(1);
    }
}

/// Generate many seeds and save the metrics
fn cmd_batch(
    config: MapGenConfig,
    request: ValidatedRequest,
    count: u32,
    parallel: u32,
    seed: u64,
    output: PathBuf,
) {
    let batch = BatchConfig::new(request, count)
        .with_seed(seed)
        .with_parallel(parallel)
        .with_generation(config);
    let results = run_batch(batch);

    if let Err(e) = results.save(&output) {
        fail(format!("Failed to save results to '{}': {e}", output.display()));
    }

    let summary = &results.summary;
    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Maps generated: {}", summary.total_maps);
    if !results.errors.is_empty() {
        eprintln!("Errors: {}", results.errors.len());
    }
    eprintln!("Spawns clear: {}/{}", summary.clear_spawn_maps, summary.total_maps);
    eprintln!("Avg resource coverage: {:.2}%", summary.avg_resource_coverage * 100.0);
    eprintln!("Avg deposits per map: {:.1}", summary.avg_clusters);
    if let Some(d) = summary.min_spawn_separation {
        eprintln!("Min spawn separation: {d:.1}");
    }
    eprintln!("Duration: {:.1}s", results.duration_seconds);
    eprintln!("Results: {}", output.display());
}
