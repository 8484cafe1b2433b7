//! Map artifacts on disk.
//!
//! Maps are stored either as JSON (the shape other services read) or as
//! compact bincode. The format follows the file extension: `.bin` is binary,
//! anything else is JSON.

use std::path::{Path, PathBuf};

use mapgen_core::error::MapGenError;
use mapgen_core::map::Map;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for artifact operations.
#[derive(Error, Debug)]
pub enum ArtifactError {
    /// Failed to read or write the file.
    #[error("Artifact I/O failed for '{path}': {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Failed to encode or decode the map.
    #[error(transparent)]
    Map(#[from] MapGenError),
}

/// On-disk encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ArtifactFormat {
    /// Indented JSON.
    #[default]
    Json,
    /// bincode.
    Binary,
}

impl ArtifactFormat {
    /// Format implied by a path's extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("bin") => Self::Binary,
            _ => Self::Json,
        }
    }
}

/// Write a map, creating parent directories as needed.
pub fn save_map(map: &Map, path: &Path) -> Result<(), ArtifactError> {
    let io_error = |source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    let bytes = match ArtifactFormat::from_path(path) {
        ArtifactFormat::Json => map.to_json_pretty()?.into_bytes(),
        ArtifactFormat::Binary => map.encode()?,
    };
    std::fs::write(path, bytes).map_err(io_error)
}

/// Read a map written by [`save_map`].
pub fn load_map(path: &Path) -> Result<Map, ArtifactError> {
    let bytes = std::fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let map = match ArtifactFormat::from_path(path) {
        ArtifactFormat::Json => {
            let text = String::from_utf8(bytes)
                .map_err(|e| MapGenError::Encoding(format!("Map JSON is not UTF-8: {e}")))?;
            Map::from_json(&text)?
        }
        ArtifactFormat::Binary => Map::decode(&bytes)?,
    };
    Ok(map)
}
