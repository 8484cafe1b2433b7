//! Headless map generation runner.
//!
//! This crate wraps the generation core with the pieces a service or CI job
//! needs around it:
//!
//! - **Request validation**: raw sizes and player counts checked up front
//! - **Background generation**: a worker thread with timeout and a
//!   completion event
//! - **Artifacts**: JSON or binary maps on disk
//! - **ASCII projection**: terrain as text for terminals and logs
//! - **Batch metrics**: many seeds in parallel, summarized
//!
//! # Example
//!
//! ```bash
//! # Generate a map and print it
//! cargo run -p mapgen_headless -- generate --width 100 --height 100 --players 2 --seed 7 --ascii
//!
//! # Render a stored map
//! cargo run -p mapgen_headless -- render --input maps/map.json
//!
//! # Verify determinism
//! cargo run -p mapgen_headless -- verify --seed 7 --runs 5
//! ```

pub mod artifact;
pub mod ascii;
pub mod batch;
pub mod metrics;
pub mod request;
pub mod worker;

pub use artifact::{load_map, save_map, ArtifactError, ArtifactFormat};
pub use ascii::{render_ascii, render_map, AsciiConfig};
pub use batch::{run_batch, verify_determinism, BatchConfig, BatchResults};
pub use metrics::{BatchSummary, MapMetrics};
pub use request::{GenerationRequest, RequestError, ValidatedRequest};
pub use worker::{spawn_generation, GenerationHandle, GenerationJob, MapGenerated, WorkerError};
