//! Background map generation.
//!
//! Generation is CPU-bound, so callers hand it to a dedicated thread with
//! [`spawn_generation`] and keep their own loop responsive. The returned
//! [`GenerationHandle`] is waited on with a timeout. When a job finishes and
//! its artifact (if any) is written, a [`MapGenerated`] event is sent to the
//! optional event channel.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use mapgen_core::config::MapGenConfig;
use mapgen_core::error::MapGenError;
use mapgen_core::map::{Map, MapId, SessionId};
use mapgen_core::rng::seeded_rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::artifact::{save_map, ArtifactError};
use crate::request::ValidatedRequest;

/// Error type for background generation.
#[derive(Error, Debug)]
pub enum WorkerError {
    /// The job did not finish in time. It keeps running but its result is
    /// dropped.
    #[error("Map generation timed out after {0:?}")]
    Timeout(Duration),
    /// The worker thread could not be started.
    #[error("Failed to start generation worker: {0}")]
    Spawn(#[source] std::io::Error),
    /// The worker thread ended without a result.
    #[error("Generation worker exited without a result")]
    Disconnected,
    /// Generation failed.
    #[error(transparent)]
    Generation(#[from] MapGenError),
    /// Writing the artifact failed.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Raised once a map is generated and stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapGenerated {
    /// Session that asked for the map.
    pub session_id: SessionId,
    /// The new map.
    pub map_id: MapId,
}

/// One generation job.
#[derive(Debug, Clone)]
pub struct GenerationJob {
    /// Requesting session.
    pub session_id: SessionId,
    /// Validated size and players.
    pub request: ValidatedRequest,
    /// Generation settings.
    pub config: MapGenConfig,
    /// RNG seed.
    pub seed: u64,
    /// Where to store the artifact, if anywhere.
    pub output: Option<PathBuf>,
}

impl GenerationJob {
    /// Job with default config and no artifact.
    #[must_use]
    pub fn new(session_id: SessionId, request: ValidatedRequest, seed: u64) -> Self {
        Self {
            session_id,
            request,
            config: MapGenConfig::default(),
            seed,
            output: None,
        }
    }

    /// Use the given config.
    #[must_use]
    pub fn with_config(mut self, config: MapGenConfig) -> Self {
        self.config = config;
        self
    }

    /// Store the artifact at `path`.
    #[must_use]
    pub fn with_output(mut self, path: PathBuf) -> Self {
        self.output = Some(path);
        self
    }

    /// Generate, store and announce. Runs on the calling thread.
    pub fn run(self, events: Option<&Sender<MapGenerated>>) -> Result<Map, WorkerError> {
        let ValidatedRequest { size, players } = self.request;
        debug!(session = %self.session_id, size = %size, players, seed = self.seed, "generation job started");

        let (map, _) = Map::generated(MapId::new(), size, players, &self.config, &mut seeded_rng(self.seed))?;
        if let Some(path) = &self.output {
            save_map(&map, path)?;
            info!(map = %map.id(), path = %path.display(), "map artifact written");
        }

        if let Some(events) = events {
            let event = MapGenerated {
                session_id: self.session_id,
                map_id: map.id(),
            };
            if events.send(event).is_err() {
                warn!(session = %self.session_id, "map generated event dropped, no listener");
            }
        }
        Ok(map)
    }
}

/// Handle to a job running on a worker thread.
#[derive(Debug)]
pub struct GenerationHandle {
    session_id: SessionId,
    result: Receiver<Result<Map, WorkerError>>,
    thread: JoinHandle<()>,
}

impl GenerationHandle {
    /// Session the job belongs to.
    #[must_use]
    pub const fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Whether the worker thread has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait up to `timeout` for the map.
    pub fn wait(self, timeout: Duration) -> Result<Map, WorkerError> {
        match self.result.recv_timeout(timeout) {
            Ok(result) => {
                // the worker sends as its last act
                let _ = self.thread.join();
                result
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(session = %self.session_id, ?timeout, "generation timed out");
                Err(WorkerError::Timeout(timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err(WorkerError::Disconnected),
        }
    }
}

/// Run `job` on a new thread.
pub fn spawn_generation(
    job: GenerationJob,
    events: Option<Sender<MapGenerated>>,
) -> Result<GenerationHandle, WorkerError> {
    let session_id = job.session_id;
    let (tx, rx) = mpsc::channel();
    let thread = thread::Builder::new()
        .name(format!("mapgen-{session_id}"))
        .spawn(move || {
            let result = job.run(events.as_ref());
            let _ = tx.send(result);
        })
        .map_err(WorkerError::Spawn)?;

    Ok(GenerationHandle {
        session_id,
        result: rx,
        thread,
    })
}
