use serde::{Deserialize, Serialize};
use std::fmt;

/// Locus carried by TFs that were produced rather than placed on the chromosome.
pub const UNPLACED_LOCUS: i64 = i64::MAX;

/// A TF is identified by its distance encoding together with its sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TfIdentity {
    pub distance: String,
    pub sequence: String,
}

impl TfIdentity {
    pub fn new(distance: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self {
            distance: distance.into(),
            sequence: sequence.into(),
        }
    }
}

impl fmt::Display for TfIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.distance, self.sequence)
    }
}

/// Remaining lifetime of a TF instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifespan {
    Ticks(i64),
    /// Cytoplasmic determinants never age.
    Eternal,
}

impl Lifespan {
    /// Ages by `rate` ticks; `None` once the instance has expired.
    #[must_use]
    pub fn age(self, rate: i64) -> Option<Lifespan> {
        match self {
            Lifespan::Eternal => Some(Lifespan::Eternal),
            Lifespan::Ticks(ttl) => {
                let left = ttl.saturating_sub(rate);
                (left > 0).then_some(Lifespan::Ticks(left))
            }
        }
    }

    #[must_use]
    pub fn is_eternal(self) -> bool {
        matches!(self, Lifespan::Eternal)
    }
}

/// Class of a TF, selected by the leading letter of its type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TfKind {
    Local,
    Cytoplasmic,
    Morphogen,
}

impl TfKind {
    /// `m…` is a morphogen, `c…` is cytoplasmic, anything else is local.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().chars().next() {
            Some('m' | 'M') => TfKind::Morphogen,
            Some('c' | 'C') => TfKind::Cytoplasmic,
            _ => TfKind::Local,
        }
    }
}

/// Description of a TF instance found in a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TfRecord {
    pub identity: TfIdentity,
    pub locus: i64,
    pub lifespan: Lifespan,
}
