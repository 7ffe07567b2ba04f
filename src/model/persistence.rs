use crate::model::chromosome::Chromosome;
use crate::model::config::MorphoConfig;
use crate::model::grid::Grid;
use crate::model::snapshot::GridSnapshot;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

const CURRENT_SAVE_VERSION: u32 = 1;

/// Struct used for saving a snapshot with versioning metadata.
/// Holds references to the config and snapshot to avoid cloning.
#[derive(Serialize)]
pub struct SaveStateRef<'a> {
    pub version: u32,
    pub config: &'a MorphoConfig,
    pub snapshot: &'a GridSnapshot,
}

/// Struct used for loading a snapshot. The config is the one the grid was
/// running with when it was saved.
#[derive(Deserialize, Debug)]
pub struct SaveState {
    pub version: u32,
    pub config: MorphoConfig,
    pub snapshot: GridSnapshot,
}

impl SaveState {
    /// Rebuilds the saved grid with its saved config.
    pub fn into_grid(self, chromosome: Arc<Chromosome>) -> Result<Grid> {
        Grid::restore(self.config, chromosome, &self.snapshot)
            .context("Snapshot does not fit its saved configuration")
    }

    /// Rebuilds the saved grid, refusing a caller config that differs from
    /// the saved one.
    pub fn into_grid_with(self, config: &MorphoConfig, chromosome: Arc<Chromosome>) -> Result<Grid> {
        if *config != self.config {
            anyhow::bail!(
                "Snapshot was saved with a different configuration (saved seed {}, given seed {})",
                self.config.seed,
                config.seed
            );
        }
        self.into_grid(chromosome)
    }
}

/// Encodes the grid's config and full state as versioned JSON.
pub fn encode_snapshot(grid: &Grid) -> Result<String> {
    let snapshot = grid.snapshot();
    let state = SaveStateRef {
        version: CURRENT_SAVE_VERSION,
        config: grid.config(),
        snapshot: &snapshot,
    };
    serde_json::to_string(&state).context("Failed to serialize snapshot")
}

/// Decodes versioned JSON produced by [`encode_snapshot`].
pub fn decode_snapshot(content: &str) -> Result<SaveState> {
    let state: SaveState =
        serde_json::from_str(content).context("Failed to deserialize snapshot")?;
    match state.version {
        1 => Ok(state),
        v if v > CURRENT_SAVE_VERSION => {
            anyhow::bail!(
                "Snapshot version {} is newer than supported version {}",
                v,
                CURRENT_SAVE_VERSION
            );
        }
        v => anyhow::bail!("Unsupported snapshot version: {}", v),
    }
}

/// Saves the grid state to a file with versioning metadata.
pub fn save_snapshot(grid: &Grid, path: impl AsRef<Path>) -> Result<()> {
    let data = encode_snapshot(grid)?;
    fs::write(&path, data).context("Failed to write snapshot file")?;
    tracing::info!(tick = grid.tick(), path = %path.as_ref().display(), "Snapshot saved");
    Ok(())
}

fn read_snapshot(path: &Path) -> Result<SaveState> {
    let content = fs::read_to_string(path).context("Failed to read snapshot file")?;
    decode_snapshot(&content)
}

/// Loads a snapshot file and rebuilds the grid with the config saved in it.
pub fn load_snapshot(path: impl AsRef<Path>, chromosome: Arc<Chromosome>) -> Result<Grid> {
    read_snapshot(path.as_ref())?.into_grid(chromosome)
}

/// Loads a snapshot file, checking that it was saved with `config`.
pub fn load_snapshot_with_config(
    path: impl AsRef<Path>,
    config: &MorphoConfig,
    chromosome: Arc<Chromosome>,
) -> Result<Grid> {
    read_snapshot(path.as_ref())?.into_grid_with(config, chromosome)
}
