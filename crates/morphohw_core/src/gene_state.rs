//! Per-cell expression state of one gene.
//!
//! A gene is either free, carrying an activation level derived from its
//! bound sites, or transcribing under exactly one polymerase.

use crate::error::{MorphoError, Result};
use crate::polymerase::Polymerase;
use morphohw_data::{BindSite, Gene, GeneStateSnapshot, TranscriptProduct};

#[derive(Debug, Clone, PartialEq)]
pub struct GeneState {
    activation: f64,
    polymerase: Option<usize>,
    pub(crate) enhancer_bound: Vec<u32>,
    pub(crate) repressor_bound: Vec<u32>,
}

/// `count / sqrt(distance)` over the bound sites of one side.
fn side_metric(sites: &[BindSite], bound: &[u32]) -> f64 {
    let (count, distance) = sites
        .iter()
        .zip(bound)
        .filter(|(_, &b)| b > 0)
        .fold((0u64, 0i64), |(c, d), (site, &b)| {
            (c + u64::from(b), d + site.distance)
        });
    if count == 0 || distance <= 0 {
        0.0
    } else {
        count as f64 / (distance as f64).sqrt()
    }
}

impl GeneState {
    #[must_use]
    pub fn new(gene: &Gene) -> Self {
        Self {
            activation: 0.0,
            polymerase: None,
            enhancer_bound: vec![0; gene.enhancers.len()],
            repressor_bound: vec![0; gene.repressors.len()],
        }
    }

    #[must_use]
    pub fn activation(&self) -> f64 {
        self.activation
    }

    /// Index of the transcribing polymerase, if any.
    #[must_use]
    pub fn polymerase(&self) -> Option<usize> {
        self.polymerase
    }

    #[must_use]
    pub fn is_free(&self) -> bool {
        self.polymerase.is_none()
    }

    #[must_use]
    pub fn enhancer_bound(&self) -> &[u32] {
        &self.enhancer_bound
    }

    #[must_use]
    pub fn repressor_bound(&self) -> &[u32] {
        &self.repressor_bound
    }

    /// Recomputes activation as `(E - R) / (E + R)`, 0 when nothing is bound.
    pub fn update_activation(&mut self, gene: &Gene) -> f64 {
        let enhance = side_metric(&gene.enhancers, &self.enhancer_bound);
        let repress = side_metric(&gene.repressors, &self.repressor_bound);
        let total = enhance + repress;
        self.activation = if total > 0.0 {
            (enhance - repress) / total
        } else {
            0.0
        };
        self.activation
    }

    /// Starts transcription: the polymerase moves to the gene locus.
    pub fn bind_polymerase(&mut self, gene: &Gene, index: usize, polymerase: &mut Polymerase) {
        polymerase.bind(index, gene.locus);
        self.polymerase = Some(index);
    }

    pub(crate) fn attach(&mut self, index: usize) {
        self.polymerase = Some(index);
    }

    /// One transcription step: reads the product at the polymerase locus,
    /// then advances. Past the end locus both sides are released.
    pub fn transcribe_step<'g>(
        &mut self,
        gene: &'g Gene,
        polymerase: &mut Polymerase,
    ) -> Option<&'g TranscriptProduct> {
        let product = gene.product_at(polymerase.locus());
        polymerase.advance();
        if polymerase.locus() > gene.end_locus {
            polymerase.release();
            self.polymerase = None;
        }
        product
    }

    pub fn clear(&mut self) {
        self.activation = 0.0;
        self.polymerase = None;
        self.enhancer_bound.fill(0);
        self.repressor_bound.fill(0);
    }

    #[must_use]
    pub fn snapshot(&self) -> GeneStateSnapshot {
        GeneStateSnapshot {
            activation: self.activation,
            enhancer_bound: self.enhancer_bound.clone(),
            repressor_bound: self.repressor_bound.clone(),
        }
    }

    /// Restores activation and site counts; the polymerase link is restored
    /// separately from the polymerase side.
    pub fn restore(&mut self, snapshot: &GeneStateSnapshot) -> Result<()> {
        if snapshot.enhancer_bound.len() != self.enhancer_bound.len()
            || snapshot.repressor_bound.len() != self.repressor_bound.len()
        {
            return Err(MorphoError::contract(format!(
                "gene state has {} enhancer and {} repressor sites, snapshot has {} and {}",
                self.enhancer_bound.len(),
                self.repressor_bound.len(),
                snapshot.enhancer_bound.len(),
                snapshot.repressor_bound.len()
            )));
        }
        self.activation = snapshot.activation;
        self.polymerase = None;
        self.enhancer_bound.clone_from(&snapshot.enhancer_bound);
        self.repressor_bound.clone_from(&snapshot.repressor_bound);
        Ok(())
    }
}
