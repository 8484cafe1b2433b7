//! File-level tests for artifacts, batch results and the worker.

use std::sync::mpsc;
use std::time::Duration;

use mapgen_core::map::SessionId;
use mapgen_core::spawn::SpawnConfig;
use mapgen_headless::{
    load_map, render_map, run_batch, save_map, spawn_generation, ArtifactError, AsciiConfig, BatchConfig,
    BatchResults, GenerationJob, GenerationRequest,
};
use mapgen_test_utils::determinism::map_hash;
use mapgen_test_utils::fixtures::{generated_map, map_from_symbols};
use tempfile::TempDir;

#[test]
fn test_json_artifact_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("maps").join("map.json");
    let map = generated_map(50, 40, 2);

    save_map(&map, &path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"terrainData\""));
    assert!(text.contains("\"spawnPoints\""));

    let loaded = load_map(&path).unwrap();
    assert_eq!(loaded, map);
}

#[test]
fn test_binary_artifact_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("map.bin");
    let map = generated_map(64, 64, 4);

    save_map(&map, &path).unwrap();
    let loaded = load_map(&path).unwrap();
    assert_eq!(map_hash(&loaded), map_hash(&map));
    assert_eq!(loaded.id(), map.id());
}

#[test]
fn test_corrupt_artifact_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("map.json");
    std::fs::write(&path, r#"{"id":"not-a-uuid","size":{"x":1,"y":1}}"#).unwrap();
    assert!(matches!(load_map(&path), Err(ArtifactError::Map(_))));
}

#[test]
fn test_render_stored_map() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tiny.json");
    save_map(&map_from_symbols(&["X#.", "   ", "GCI"], &[(1, 1)]), &path).unwrap();

    let loaded = load_map(&path).unwrap();
    let config = AsciiConfig {
        show_spawns: true,
        ..AsciiConfig::plain()
    };
    assert_eq!(render_map(&loaded, &config), "X#.\n 1 \nGCI\n");
}

#[test]
fn test_worker_writes_artifact_before_event() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.json");
    let request = GenerationRequest::new(40, 40, 2)
        .validate(&SpawnConfig::default())
        .unwrap();
    let session = SessionId::new();
    let job = GenerationJob::new(session, request, 17).with_output(path.clone());

    let (tx, rx) = mpsc::channel();
    let map = spawn_generation(job, Some(tx))
        .unwrap()
        .wait(Duration::from_secs(30))
        .unwrap();

    let event = rx.recv_timeout(Duration::from_secs(1)).unwrap();
    assert_eq!(event.map_id, map.id());
    assert_eq!(event.session_id, session);
    assert_eq!(load_map(&path).unwrap(), map);
}

#[test]
fn test_batch_results_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("results").join("batch.json");
    let request = GenerationRequest::new(32, 32, 2)
        .validate(&SpawnConfig::default())
        .unwrap();
    let results = run_batch(BatchConfig::new(request, 3).with_seed(7));

    results.save(&path).unwrap();
    let loaded = BatchResults::load(&path).unwrap();
    assert_eq!(loaded.maps, results.maps);
    assert_eq!(loaded.summary, results.summary);
}
