//! RNA polymerase: a cursor over the chromosome that is either idle or
//! walking one gene's coding region.

use morphohw_data::PolymeraseSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Polymerase {
    locus: i64,
    gene: Option<usize>,
}

impl Polymerase {
    /// An idle polymerase parked at `locus`.
    #[must_use]
    pub fn new(locus: i64) -> Self {
        Self { locus, gene: None }
    }

    #[must_use]
    pub fn locus(&self) -> i64 {
        self.locus
    }

    #[must_use]
    pub fn gene(&self) -> Option<usize> {
        self.gene
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.gene.is_some()
    }

    pub(crate) fn bind(&mut self, gene: usize, locus: i64) {
        self.gene = Some(gene);
        self.locus = locus;
    }

    pub(crate) fn advance(&mut self) {
        self.locus += 1;
    }

    pub fn release(&mut self) {
        self.gene = None;
    }

    #[must_use]
    pub fn snapshot(&self) -> PolymeraseSnapshot {
        PolymeraseSnapshot {
            locus: self.locus,
            gene: self.gene,
        }
    }

    #[must_use]
    pub fn from_snapshot(snapshot: &PolymeraseSnapshot) -> Self {
        Self {
            locus: snapshot.locus,
            gene: snapshot.gene,
        }
    }
}

/// Polymerases per cell. A ratio above 1 is an absolute count, otherwise it
/// scales the gene count; a non-positive ratio still yields one polymerase
/// when there are genes.
#[must_use]
pub fn polymerase_count(ratio: f64, genes: usize) -> usize {
    if ratio > 1.0 {
        return ratio.round() as usize;
    }
    let scaled = (genes as f64 * ratio).round().max(0.0) as usize;
    if scaled < 1 && genes > 0 && ratio <= 0.0 {
        1
    } else {
        scaled
    }
}
