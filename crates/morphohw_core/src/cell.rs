//! One cell of the grid and its per-tick gene-regulatory step.
//!
//! Each tick runs five phases in a fixed order:
//!
//! 1. **Binding** - every free gene re-resolves its enhancer and repressor
//!    sites against the TF pool and the substrate.
//! 2. **Activation** - free genes recompute activation; the non-negative
//!    ones form the recruitment pool.
//! 3. **Recruitment** - idle polymerases may pick a gene, weighted by
//!    activation.
//! 4. **TF update** - aging, expiry and morphogen release.
//! 5. **Transcription** - bound polymerases walk their genes and emit
//!    products.
//!
//! A cell only mutates its own state. Morphogens it emits are pushed into
//! the context's outbox as they are created, and the grid schedules them
//! into the target cells once the step ends, whether or not it failed.

use crate::chromosome::Chromosome;
use crate::config::{ExpressionConfig, TfConfig};
use crate::error::{MorphoError, Result};
use crate::gene_state::GeneState;
use crate::metrics::Metrics;
use crate::morphogen::{plan_deliveries, GridDims, MorphogenDelivery};
use crate::polymerase::Polymerase;
use crate::substrate::Substrate;
use crate::tf_pool::TfPool;
use morphohw_data::{
    BindCandidate, BindSite, CellCoord, CellSnapshot, TfKind, TfProduct, TranscriptProduct,
    UNPLACED_LOCUS,
};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Everything outside the cell that a step reads or drives.
pub struct StepContext<'a, S: Substrate + ?Sized> {
    pub chromosome: &'a Chromosome,
    pub expression: &'a ExpressionConfig,
    pub tf: &'a TfConfig,
    pub dims: GridDims,
    pub rng: &'a mut ChaCha8Rng,
    pub substrate: &'a mut S,
    pub metrics: &'a Metrics,
    pub outbox: &'a mut Vec<MorphogenDelivery>,
}

#[derive(Debug, Clone)]
pub struct Cell {
    coord: CellCoord,
    genes: Vec<GeneState>,
    polymerases: Vec<Polymerase>,
    tfs: TfPool,
    total_free_activation: f64,
}

impl Cell {
    #[must_use]
    pub fn new(
        coord: CellCoord,
        chromosome: &Chromosome,
        polymerases: Vec<Polymerase>,
        tf: TfConfig,
    ) -> Self {
        Self {
            coord,
            genes: chromosome.genes().iter().map(GeneState::new).collect(),
            polymerases,
            tfs: TfPool::new(tf),
            total_free_activation: 0.0,
        }
    }

    #[must_use]
    pub fn coord(&self) -> CellCoord {
        self.coord
    }

    #[must_use]
    pub fn genes(&self) -> &[GeneState] {
        &self.genes
    }

    #[must_use]
    pub fn polymerases(&self) -> &[Polymerase] {
        &self.polymerases
    }

    #[must_use]
    pub fn tfs(&self) -> &TfPool {
        &self.tfs
    }

    pub fn tfs_mut(&mut self) -> &mut TfPool {
        &mut self.tfs
    }

    #[must_use]
    pub fn total_free_activation(&self) -> f64 {
        self.total_free_activation
    }

    /// Number of genes currently being transcribed.
    #[must_use]
    pub fn active_gene_count(&self) -> usize {
        self.genes.iter().filter(|g| !g.is_free()).count()
    }

    /// Indices of genes currently being transcribed.
    pub fn active_genes(&self) -> impl Iterator<Item = usize> + '_ {
        self.genes
            .iter()
            .enumerate()
            .filter(|(_, g)| !g.is_free())
            .map(|(i, _)| i)
    }

    /// Runs one tick of this cell. Morphogens emitted during the step land
    /// in `ctx.outbox`, including those emitted before an error.
    pub fn step<S: Substrate + ?Sized>(&mut self, ctx: &mut StepContext<'_, S>) -> Result<()> {
        self.resolve_bindings(ctx)?;
        let pool = self.recompute_activation(ctx.chromosome);
        self.recruit_polymerases(ctx, pool);
        self.tfs.update_tfs();
        self.transcribe(ctx)
    }

    fn resolve_bindings<S: Substrate + ?Sized>(&mut self, ctx: &mut StepContext<'_, S>) -> Result<()> {
        let chromosome = ctx.chromosome;
        for (gene, state) in chromosome.genes().iter().zip(self.genes.iter_mut()) {
            if !state.is_free() {
                continue;
            }
            for (site, bound) in gene.enhancers.iter().zip(state.enhancer_bound.iter_mut()) {
                *bound = u32::from(resolve_site(self.coord, site, &mut self.tfs, ctx)?);
            }
            for (site, bound) in gene.repressors.iter().zip(state.repressor_bound.iter_mut()) {
                *bound = u32::from(resolve_site(self.coord, site, &mut self.tfs, ctx)?);
            }
        }
        Ok(())
    }

    fn recompute_activation(&mut self, chromosome: &Chromosome) -> f64 {
        let mut pool = 0.0;
        for (gene, state) in chromosome.genes().iter().zip(self.genes.iter_mut()) {
            if !state.is_free() {
                continue;
            }
            let activation = state.update_activation(gene);
            if activation >= 0.0 {
                pool += activation;
            }
        }
        pool
    }

    fn recruit_polymerases<S: Substrate + ?Sized>(
        &mut self,
        ctx: &mut StepContext<'_, S>,
        mut pool: f64,
    ) {
        let chromosome = ctx.chromosome;
        for index in 0..self.polymerases.len() {
            if self.polymerases[index].is_bound() {
                continue;
            }
            let draw: f64 = ctx.rng.gen();
            if draw < ctx.expression.activation_threshold {
                continue;
            }
            let target = ctx.rng.gen::<f64>() * pool;

            let Some(chosen) = self.select_gene(target) else {
                continue;
            };
            let Some(gene) = chromosome.gene(chosen) else {
                continue;
            };
            let state = &mut self.genes[chosen];
            pool -= state.activation();
            state.bind_polymerase(gene, index, &mut self.polymerases[index]);
            ctx.metrics.record_recruitment();
            tracing::debug!(cell = %self.coord, gene = chosen, polymerase = index, "Polymerase recruited");
        }
        self.total_free_activation = pool;
    }

    /// First eligible gene whose running activation sum reaches `target`,
    /// falling back to the last eligible gene.
    fn select_gene(&self, target: f64) -> Option<usize> {
        let mut sum = 0.0;
        let mut last = None;
        for (i, state) in self.genes.iter().enumerate() {
            if !state.is_free() || state.activation() < 0.0 {
                continue;
            }
            sum += state.activation();
            last = Some(i);
            if sum >= target {
                return Some(i);
            }
        }
        last
    }

    fn transcribe<S: Substrate + ?Sized>(&mut self, ctx: &mut StepContext<'_, S>) -> Result<()> {
        let chromosome = ctx.chromosome;
        for _ in 0..ctx.expression.transcription_rate {
            for index in 0..self.polymerases.len() {
                let Some(gene_index) = self.polymerases[index].gene() else {
                    continue;
                };
                let Some(gene) = chromosome.gene(gene_index) else {
                    return Err(MorphoError::contract(format!(
                        "polymerase {index} of cell {} bound to unknown gene {gene_index}",
                        self.coord
                    )));
                };
                let product =
                    self.genes[gene_index].transcribe_step(gene, &mut self.polymerases[index]);
                if let Some(product) = product {
                    self.emit(product, ctx)?;
                }
            }
        }
        Ok(())
    }

    fn emit<S: Substrate + ?Sized>(
        &mut self,
        product: &TranscriptProduct,
        ctx: &mut StepContext<'_, S>,
    ) -> Result<()> {
        match product {
            TranscriptProduct::Configure(command) => {
                tracing::trace!(cell = %self.coord, command = %command, "Configure");
                ctx.substrate
                    .configure(self.coord.row, self.coord.col, command)
                    .map_err(|e| MorphoError::substrate(self.coord.row, self.coord.col, e))?;
                ctx.metrics.record_configure();
            }
            TranscriptProduct::Tf(TfProduct::Local(identity)) => {
                self.tfs
                    .create_tf(identity.clone(), TfKind::Local, UNPLACED_LOCUS, None);
                ctx.metrics.record_tf_created();
            }
            TranscriptProduct::Tf(TfProduct::Cytoplasmic(identity)) => {
                self.tfs
                    .create_tf(identity.clone(), TfKind::Cytoplasmic, UNPLACED_LOCUS, None);
                ctx.metrics.record_tf_created();
            }
            TranscriptProduct::Tf(TfProduct::Morphogen { spread, sequence }) => {
                let deliveries = plan_deliveries(
                    &mut *ctx.rng,
                    self.coord,
                    *spread,
                    sequence,
                    UNPLACED_LOCUS,
                    ctx.dims,
                    ctx.tf,
                );
                ctx.metrics.record_morphogens(deliveries.len());
                ctx.outbox.extend(deliveries);
            }
        }
        Ok(())
    }

    /// Empties the TF pool and returns every gene and polymerase to idle.
    pub fn clear(&mut self) {
        self.tfs.clear();
        self.genes.iter_mut().for_each(GeneState::clear);
        self.polymerases.iter_mut().for_each(Polymerase::release);
        self.total_free_activation = 0.0;
    }

    #[must_use]
    pub fn snapshot(&self) -> CellSnapshot {
        CellSnapshot {
            coord: self.coord,
            total_free_activation: self.total_free_activation,
            polymerases: self.polymerases.iter().map(Polymerase::snapshot).collect(),
            genes: self.genes.iter().map(GeneState::snapshot).collect(),
            tfs: self.tfs.snapshot(),
        }
    }

    /// Restores state captured by [`Cell::snapshot`] into a cell built for
    /// the same chromosome and polymerase count.
    pub fn restore(&mut self, snapshot: &CellSnapshot) -> Result<()> {
        if snapshot.coord != self.coord {
            return Err(MorphoError::snapshot(format!(
                "snapshot for cell {} restored into cell {}",
                snapshot.coord, self.coord
            )));
        }
        if snapshot.genes.len() != self.genes.len()
            || snapshot.polymerases.len() != self.polymerases.len()
        {
            return Err(MorphoError::snapshot(format!(
                "cell {} snapshot has {} genes and {} polymerases, expected {} and {}",
                self.coord,
                snapshot.genes.len(),
                snapshot.polymerases.len(),
                self.genes.len(),
                self.polymerases.len()
            )));
        }

        for (state, saved) in self.genes.iter_mut().zip(&snapshot.genes) {
            state.restore(saved)?;
        }
        for (index, saved) in snapshot.polymerases.iter().enumerate() {
            if let Some(gene) = saved.gene {
                let state = self.genes.get_mut(gene).ok_or_else(|| {
                    MorphoError::snapshot(format!("cell {}: unknown gene {gene}", self.coord))
                })?;
                if !state.is_free() {
                    return Err(MorphoError::snapshot(format!(
                        "cell {}: gene {gene} claimed by two polymerases",
                        self.coord
                    )));
                }
                state.attach(index);
            }
            self.polymerases[index] = Polymerase::from_snapshot(saved);
        }
        self.tfs.restore(&snapshot.tfs)?;
        self.total_free_activation = snapshot.total_free_activation;
        Ok(())
    }
}

/// A site is bound when any candidate resolves, tried in order.
fn resolve_site<S: Substrate + ?Sized>(
    coord: CellCoord,
    site: &BindSite,
    tfs: &mut TfPool,
    ctx: &mut StepContext<'_, S>,
) -> Result<bool> {
    for candidate in &site.candidates {
        let hit = match &candidate.candidate {
            BindCandidate::Tf(identity) => {
                if tfs.get_bound_tf(identity, candidate.locus).is_some() {
                    true
                } else if tfs.get_free_tf(identity, candidate.locus).is_some() {
                    let bound = tfs.bind_tf(identity, candidate.locus)?.is_some();
                    if bound {
                        ctx.metrics.record_tf_bind();
                    }
                    bound
                } else {
                    false
                }
            }
            BindCandidate::Connection => ctx
                .substrate
                .query_binding(coord.row, coord.col, &candidate.specifier, candidate.locus)
                .map_err(|e| MorphoError::substrate(coord.row, coord.col, e))?,
        };
        if hit {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::substrate::NullSubstrate;
    use morphohw_data::TfIdentity;
    use rand::SeedableRng;

    const GATED: &str = "\
0,100: prom,-10,5: ACGTA
0,100: gene,0,1: 0,1,X
0,100: enhb,-30,4: 0,2,TF=l,01,GG
";

    struct Harness {
        chromosome: Chromosome,
        expression: ExpressionConfig,
        tf: TfConfig,
        rng: ChaCha8Rng,
        metrics: Metrics,
    }

    impl Harness {
        fn new(text: &str) -> Self {
            Self {
                chromosome: Chromosome::parse(text, None).unwrap(),
                expression: ExpressionConfig {
                    polymerase_ratio: 1.0,
                    activation_threshold: 0.0,
                    transcription_rate: 1,
                    gene_limit: None,
                },
                tf: TfConfig::default(),
                rng: ChaCha8Rng::seed_from_u64(3),
                metrics: Metrics::new(),
            }
        }

        fn cell(&self) -> Cell {
            Cell::new(
                CellCoord::new(0, 0),
                &self.chromosome,
                vec![Polymerase::new(0)],
                self.tf,
            )
        }

        fn step(&mut self, cell: &mut Cell) -> Vec<MorphogenDelivery> {
            let mut substrate = NullSubstrate;
            let mut outbox = Vec::new();
            let mut ctx = StepContext {
                chromosome: &self.chromosome,
                expression: &self.expression,
                tf: &self.tf,
                dims: GridDims::new(1, 1),
                rng: &mut self.rng,
                substrate: &mut substrate,
                metrics: &self.metrics,
                outbox: &mut outbox,
            };
            cell.step(&mut ctx).unwrap();
            outbox
        }
    }

    #[test]
    fn test_free_tf_binds_enhancer() {
        let mut h = Harness::new(GATED);
        let mut cell = h.cell();
        cell.tfs_mut()
            .create_tf(TfIdentity::new("01", "GG"), TfKind::Local, UNPLACED_LOCUS, None);

        h.step(&mut cell);
        assert_eq!(cell.tfs().free_count(), 0);
        assert!(cell
            .tfs()
            .get_bound_tf(&TfIdentity::new("01", "GG"), 70)
            .is_some());
        assert_eq!(cell.genes()[0].enhancer_bound(), &[1]);
        assert_eq!(cell.genes()[0].activation(), 1.0);
        assert_eq!(cell.active_gene_count(), 1);
    }

    #[test]
    fn test_unbound_gene_stays_at_zero_activation() {
        let mut h = Harness::new(GATED);
        let mut cell = h.cell();
        h.step(&mut cell);
        assert_eq!(cell.genes()[0].activation(), 0.0);
        assert_eq!(cell.genes()[0].enhancer_bound(), &[0]);
    }

    #[test]
    fn test_snapshot_restore_roundtrip() {
        let mut h = Harness::new(GATED);
        let mut cell = h.cell();
        cell.tfs_mut()
            .create_tf(TfIdentity::new("01", "GG"), TfKind::Local, UNPLACED_LOCUS, None);
        h.step(&mut cell);

        let snap = cell.snapshot();
        let mut other = h.cell();
        other.restore(&snap).unwrap();
        assert_eq!(other.snapshot(), snap);
        assert_eq!(other.active_genes().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_restore_rejects_double_claim() {
        let h = Harness::new(GATED);
        let mut cell = Cell::new(
            CellCoord::new(0, 0),
            &h.chromosome,
            vec![Polymerase::new(0), Polymerase::new(0)],
            h.tf,
        );
        let mut snap = cell.snapshot();
        for p in &mut snap.polymerases {
            p.gene = Some(0);
        }
        assert!(matches!(
            cell.restore(&snap),
            Err(MorphoError::Snapshot(_))
        ));
    }

    #[test]
    fn test_clear_resets_state() {
        let mut h = Harness::new(GATED);
        let mut cell = h.cell();
        cell.tfs_mut()
            .create_tf(TfIdentity::new("01", "GG"), TfKind::Local, UNPLACED_LOCUS, None);
        h.step(&mut cell);
        cell.clear();
        assert_eq!(cell.active_gene_count(), 0);
        assert_eq!(cell.tfs().bound_count(), 0);
        assert!(cell.polymerases().iter().all(|p| !p.is_bound()));
    }
}
