mod common;

use common::{feedback_builder, RecordingSubstrate};
use morphohw_lib::model::grid::Grid;
use morphohw_lib::model::persistence::{
    decode_snapshot, encode_snapshot, load_snapshot, load_snapshot_with_config, save_snapshot,
};
use std::path::PathBuf;
use std::sync::Arc;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("morphohw_{name}_{}.json", std::process::id()))
}

#[test]
fn test_restored_grid_continues_identically() {
    let builder = feedback_builder(99);
    let config = builder.config().clone();
    let mut substrate = RecordingSubstrate::new();
    let mut original = builder.build(&mut substrate);
    original.step_n(17, &mut substrate).unwrap();

    let encoded = encode_snapshot(&original).unwrap();
    let state = decode_snapshot(&encoded).unwrap();
    assert_eq!(state.snapshot, original.snapshot());
    assert_eq!(state.config, config);

    let mut restored =
        Grid::restore(config, Arc::clone(original.chromosome()), &state.snapshot).unwrap();
    assert_eq!(restored.tick(), 17);

    let mut substrate_a = substrate.clone();
    let mut substrate_b = substrate.clone();
    let mark = substrate.log.len();

    original.step_n(25, &mut substrate_a).unwrap();
    restored.step_n(25, &mut substrate_b).unwrap();

    assert_eq!(substrate_a.log[mark..], substrate_b.log[mark..]);
    assert_eq!(original.snapshot(), restored.snapshot());
}

#[test]
fn test_snapshot_file_reloads_with_saved_config() {
    let mut substrate = RecordingSubstrate::new();
    let mut grid = feedback_builder(5)
        .with_config(|c| {
            c.tf.free_age_rate = 2;
            c.expression.transcription_rate = 3;
        })
        .build(&mut substrate);
    grid.step_n(9, &mut substrate).unwrap();

    let path = temp_path("saved_config");
    save_snapshot(&grid, &path).unwrap();
    let mut loaded = load_snapshot(&path, Arc::clone(grid.chromosome())).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.config(), grid.config());
    assert_eq!(loaded.snapshot(), grid.snapshot());

    let mut substrate_b = substrate.clone();
    grid.step_n(12, &mut substrate).unwrap();
    loaded.step_n(12, &mut substrate_b).unwrap();
    assert_eq!(substrate.log, substrate_b.log);
    assert_eq!(loaded.snapshot(), grid.snapshot());
}

#[test]
fn test_snapshot_file_accepts_matching_config() {
    let builder = feedback_builder(5);
    let config = builder.config().clone();
    let mut substrate = RecordingSubstrate::new();
    let mut grid = builder.build(&mut substrate);
    grid.step_n(9, &mut substrate).unwrap();

    let path = temp_path("matching_config");
    save_snapshot(&grid, &path).unwrap();
    let loaded = load_snapshot_with_config(&path, &config, Arc::clone(grid.chromosome()));
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.unwrap().snapshot(), grid.snapshot());
}

#[test]
fn test_snapshot_file_rejects_different_config() {
    let builder = feedback_builder(5);
    let mut config = builder.config().clone();
    let mut substrate = RecordingSubstrate::new();
    let mut grid = builder.build(&mut substrate);
    grid.step_n(4, &mut substrate).unwrap();

    let path = temp_path("different_config");
    save_snapshot(&grid, &path).unwrap();
    config.tf.free_age_rate += 1;
    let result = load_snapshot_with_config(&path, &config, Arc::clone(grid.chromosome()));
    std::fs::remove_file(&path).ok();

    let err = result.unwrap_err();
    assert!(
        err.to_string().contains("different configuration"),
        "unexpected error: {err}"
    );
}

#[test]
fn test_newer_snapshot_version_is_rejected() {
    let mut substrate = RecordingSubstrate::new();
    let grid = feedback_builder(5).build(&mut substrate);
    let encoded = encode_snapshot(&grid).unwrap();
    let bumped = encoded.replacen("\"version\":1", "\"version\":7", 1);

    let err = decode_snapshot(&bumped).unwrap_err();
    assert!(err.to_string().contains("newer"), "unexpected error: {err}");
}

#[test]
fn test_snapshot_for_other_chromosome_is_rejected() {
    let mut substrate = RecordingSubstrate::new();
    let grid = feedback_builder(5).build(&mut substrate);
    let state = decode_snapshot(&encode_snapshot(&grid).unwrap()).unwrap();

    let other = morphohw_lib::model::chromosome::Chromosome::parse(common::ONE_GENE_X, None)
        .unwrap();
    assert!(state.into_grid(Arc::new(other)).is_err());
}
