//! Serializable records capturing the full mutable state of a cell.

use super::coord::CellCoord;
use super::tf::{Lifespan, TfIdentity};
use serde::{Deserialize, Serialize};

/// All free instances of one identity at one locus, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeTfEntry {
    pub identity: TfIdentity,
    pub locus: i64,
    pub lifespans: Vec<Lifespan>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundTfEntry {
    pub identity: TfIdentity,
    pub locus: i64,
    pub lifespan: Lifespan,
}

/// A morphogen waiting to be released into a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTfEntry {
    pub countdown: usize,
    pub identity: TfIdentity,
    pub locus: i64,
    pub ttl: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TfPoolSnapshot {
    pub free: Vec<FreeTfEntry>,
    pub bound: Vec<BoundTfEntry>,
    pub pending: Vec<PendingTfEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneStateSnapshot {
    pub activation: f64,
    pub enhancer_bound: Vec<u32>,
    pub repressor_bound: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolymeraseSnapshot {
    pub locus: i64,
    pub gene: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub coord: CellCoord,
    pub total_free_activation: f64,
    pub polymerases: Vec<PolymeraseSnapshot>,
    pub genes: Vec<GeneStateSnapshot>,
    pub tfs: TfPoolSnapshot,
}
