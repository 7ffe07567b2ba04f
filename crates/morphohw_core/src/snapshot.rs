//! Full-state grid snapshots.
//!
//! A snapshot holds every mutable piece of a grid, including the PRNG
//! stream position, so a restored grid continues exactly where the
//! original left off.

use crate::error::Result;
use morphohw_data::CellSnapshot;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GridSnapshot {
    pub tick: u64,
    pub rows: usize,
    pub cols: usize,
    pub gene_count: usize,
    pub polymerase_count: usize,
    pub rng: ChaCha8Rng,
    /// Row-major.
    pub cells: Vec<CellSnapshot>,
}

impl GridSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
