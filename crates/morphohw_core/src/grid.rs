//! The cell grid and its tick loop.
//!
//! The grid owns every cell, the single PRNG and the visitation order. A
//! tick steps each cell once in that order; morphogens a cell emits are
//! scheduled into their target cells before the next cell is visited, so
//! PRNG draws happen in a fixed, reproducible sequence.

use crate::cell::{Cell, StepContext};
use crate::chromosome::Chromosome;
use crate::config::{MorphoConfig, RegionSite};
use crate::determinants::parse_determinants;
use crate::error::{MorphoError, Result};
use crate::metrics::Metrics;
use crate::morphogen::{plan_deliveries, GridDims, MorphogenDelivery};
use crate::ordering::CellOrdering;
use crate::polymerase::{polymerase_count, Polymerase};
use crate::snapshot::GridSnapshot;
use crate::substrate::Substrate;
use morphohw_data::{
    CellCoord, SpreadCode, TfIdentity, TfKind, TfProduct, TranscriptProduct, UNPLACED_LOCUS,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug)]
pub struct Grid {
    config: MorphoConfig,
    chromosome: Arc<Chromosome>,
    dims: GridDims,
    ordering: CellOrdering,
    polymerase_count: usize,
    /// Row-major.
    cells: Vec<Cell>,
    rng: ChaCha8Rng,
    tick: u64,
    metrics: Metrics,
}

impl Grid {
    /// Builds a grid whose polymerases start idle at random loci.
    pub fn new(config: MorphoConfig, chromosome: Arc<Chromosome>) -> Result<Self> {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let length = chromosome.length();
        let mut grid = Self::assemble(config, chromosome, |_| {
            let locus = if length > 0 {
                rng.gen_range(0..length)
            } else {
                -1
            };
            Polymerase::new(locus)
        })?;
        grid.rng = rng;

        tracing::info!(
            rows = grid.dims.rows,
            cols = grid.dims.cols,
            genes = grid.chromosome.gene_count(),
            polymerases = grid.polymerase_count,
            seed = grid.config.seed,
            "Grid initialised"
        );
        Ok(grid)
    }

    /// Parses the chromosome text honouring the configured gene limit, then
    /// builds the grid.
    pub fn from_text(config: MorphoConfig, chromosome: &str) -> Result<Self> {
        let chromosome = Chromosome::parse(chromosome, config.expression.gene_limit)?;
        Self::new(config, Arc::new(chromosome))
    }

    fn assemble(
        config: MorphoConfig,
        chromosome: Arc<Chromosome>,
        mut polymerase: impl FnMut(usize) -> Polymerase,
    ) -> Result<Self> {
        config.validate()?;
        let region = config.region()?;
        let dims = GridDims::new(region.rows(), region.cols());
        let to_cells = |sites: &[RegionSite]| -> Result<Vec<CellCoord>> {
            sites.iter().map(|site| region.cell_for(site)).collect()
        };
        let inputs = to_cells(&config.anchors.inputs)?;
        let outputs = to_cells(&config.anchors.outputs)?;
        let ordering = CellOrdering::compute(dims, &inputs, &outputs)?;

        let count = polymerase_count(
            config.expression.polymerase_ratio,
            chromosome.gene_count(),
        );
        let mut cells = Vec::with_capacity(dims.cell_count());
        for row in 0..dims.rows {
            for col in 0..dims.cols {
                let polymerases = (0..count).map(&mut polymerase).collect();
                cells.push(Cell::new(
                    CellCoord::new(row, col),
                    &chromosome,
                    polymerases,
                    config.tf,
                ));
            }
        }

        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            chromosome,
            dims,
            ordering,
            polymerase_count: count,
            cells,
            tick: 0,
            metrics: Metrics::new(),
        })
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.dims.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.dims.cols
    }

    #[must_use]
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// Completed ticks.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    #[must_use]
    pub fn config(&self) -> &MorphoConfig {
        &self.config
    }

    #[must_use]
    pub fn chromosome(&self) -> &Arc<Chromosome> {
        &self.chromosome
    }

    #[must_use]
    pub fn ordering(&self) -> &CellOrdering {
        &self.ordering
    }

    #[must_use]
    pub fn polymerase_count(&self) -> usize {
        self.polymerase_count
    }

    #[must_use]
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    fn index(&self, row: usize, col: usize) -> Result<usize> {
        if self.dims.contains(CellCoord::new(row, col)) {
            Ok(row * self.dims.cols + col)
        } else {
            Err(MorphoError::contract(format!(
                "cell ({row},{col}) is outside the {}x{} grid",
                self.dims.rows, self.dims.cols
            )))
        }
    }

    pub fn cell(&self, row: usize, col: usize) -> Result<&Cell> {
        let index = self.index(row, col)?;
        Ok(&self.cells[index])
    }

    pub fn active_gene_count(&self, row: usize, col: usize) -> Result<usize> {
        Ok(self.cell(row, col)?.active_gene_count())
    }

    pub fn active_genes(&self, row: usize, col: usize) -> Result<Vec<usize>> {
        Ok(self.cell(row, col)?.active_genes().collect())
    }

    /// Total genes being transcribed across the grid.
    #[must_use]
    pub fn total_active_genes(&self) -> usize {
        self.cells.iter().map(Cell::active_gene_count).sum()
    }

    /// Runs one tick over every cell in visitation order. A substrate
    /// failure aborts the tick and is returned unchanged; the tick counter
    /// is not advanced.
    pub fn step<S: Substrate + ?Sized>(&mut self, substrate: &mut S) -> Result<()> {
        let started = Instant::now();
        for position in 0..self.ordering.order().len() {
            let coord = self.ordering.order()[position];
            self.step_at(coord, substrate)?;
        }
        self.tick += 1;
        self.metrics
            .record_tick(started.elapsed(), self.tick, self.total_active_genes());
        Ok(())
    }

    pub fn step_n<S: Substrate + ?Sized>(&mut self, ticks: usize, substrate: &mut S) -> Result<()> {
        for _ in 0..ticks {
            self.step(substrate)?;
        }
        Ok(())
    }

    /// Steps a single cell outside the tick loop.
    pub fn step_cell<S: Substrate + ?Sized>(
        &mut self,
        row: usize,
        col: usize,
        substrate: &mut S,
    ) -> Result<()> {
        self.index(row, col)?;
        self.step_at(CellCoord::new(row, col), substrate)
    }

    fn step_at<S: Substrate + ?Sized>(&mut self, coord: CellCoord, substrate: &mut S) -> Result<()> {
        let index = coord.row * self.dims.cols + coord.col;
        let mut outbox = Vec::new();
        let mut ctx = StepContext {
            chromosome: self.chromosome.as_ref(),
            expression: &self.config.expression,
            tf: &self.config.tf,
            dims: self.dims,
            rng: &mut self.rng,
            substrate,
            metrics: &self.metrics,
            outbox: &mut outbox,
        };
        let stepped = self.cells[index].step(&mut ctx);
        self.deliver(outbox);
        stepped
    }

    fn deliver(&mut self, deliveries: Vec<MorphogenDelivery>) {
        for delivery in deliveries {
            let index = delivery.target.row * self.dims.cols + delivery.target.col;
            tracing::trace!(
                target_cell = %delivery.target,
                countdown = delivery.countdown,
                tf = %delivery.identity,
                "Morphogen scheduled"
            );
            self.cells[index].tfs_mut().schedule_morphogen(
                delivery.countdown,
                delivery.identity,
                delivery.locus,
                delivery.ttl,
            );
        }
    }

    /// Adds a free TF to one cell.
    pub fn create_tf(
        &mut self,
        row: usize,
        col: usize,
        identity: TfIdentity,
        kind: TfKind,
        locus: i64,
        explicit_ttl: Option<i64>,
    ) -> Result<()> {
        let index = self.index(row, col)?;
        self.cells[index]
            .tfs_mut()
            .create_tf(identity, kind, locus, explicit_ttl);
        self.metrics.record_tf_created();
        Ok(())
    }

    /// Emits a morphogen from a cell. Returns how many cells it will reach.
    pub fn create_morphogen(
        &mut self,
        row: usize,
        col: usize,
        sequence: &str,
        spread: SpreadCode,
        locus: i64,
    ) -> Result<usize> {
        self.index(row, col)?;
        let deliveries = plan_deliveries(
            &mut self.rng,
            CellCoord::new(row, col),
            spread,
            sequence,
            locus,
            self.dims,
            &self.config.tf,
        );
        let count = deliveries.len();
        self.metrics.record_morphogens(count);
        self.deliver(deliveries);
        Ok(count)
    }

    /// Applies cytoplasmic determinants. TF products seed the named cell's
    /// pool; anything else is forwarded to the substrate.
    pub fn apply_determinants<S: Substrate + ?Sized>(
        &mut self,
        text: &str,
        substrate: &mut S,
    ) -> Result<()> {
        let determinants = parse_determinants(text)?;
        for determinant in &determinants {
            if !self.dims.contains(determinant.coord) {
                return Err(MorphoError::determinant(
                    determinant.line,
                    format!("cell {} is outside the grid", determinant.coord),
                ));
            }
        }

        let applied = determinants.len();
        for determinant in determinants {
            let CellCoord { row, col } = determinant.coord;
            match determinant.product {
                TranscriptProduct::Configure(command) => {
                    substrate
                        .configure(row, col, &command)
                        .map_err(|e| MorphoError::substrate(row, col, e))?;
                    self.metrics.record_configure();
                }
                TranscriptProduct::Tf(TfProduct::Local(identity)) => {
                    self.create_tf(row, col, identity, TfKind::Local, UNPLACED_LOCUS, None)?;
                }
                TranscriptProduct::Tf(TfProduct::Cytoplasmic(identity)) => {
                    self.create_tf(row, col, identity, TfKind::Cytoplasmic, UNPLACED_LOCUS, None)?;
                }
                TranscriptProduct::Tf(TfProduct::Morphogen { spread, sequence }) => {
                    self.create_morphogen(row, col, &sequence, spread, UNPLACED_LOCUS)?;
                }
            }
        }
        tracing::debug!(applied, "Determinants applied");
        Ok(())
    }

    /// Returns every cell to its idle state. The PRNG and tick counter are
    /// left untouched.
    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(Cell::clear);
    }

    #[must_use]
    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            tick: self.tick,
            rows: self.dims.rows,
            cols: self.dims.cols,
            gene_count: self.chromosome.gene_count(),
            polymerase_count: self.polymerase_count,
            rng: self.rng.clone(),
            cells: self.cells.iter().map(Cell::snapshot).collect(),
        }
    }

    /// Rebuilds a grid from a snapshot taken with the same chromosome and a
    /// configuration describing the same layout.
    pub fn restore(
        config: MorphoConfig,
        chromosome: Arc<Chromosome>,
        snapshot: &GridSnapshot,
    ) -> Result<Self> {
        let mut grid = Self::assemble(config, chromosome, |_| Polymerase::new(-1))?;

        if (grid.dims.rows, grid.dims.cols) != (snapshot.rows, snapshot.cols) {
            return Err(MorphoError::snapshot(format!(
                "snapshot is {}x{} but the grid is {}x{}",
                snapshot.rows, snapshot.cols, grid.dims.rows, grid.dims.cols
            )));
        }
        if snapshot.gene_count != grid.chromosome.gene_count() {
            return Err(MorphoError::snapshot(format!(
                "snapshot has {} genes but the chromosome has {}",
                snapshot.gene_count,
                grid.chromosome.gene_count()
            )));
        }
        if snapshot.polymerase_count != grid.polymerase_count {
            return Err(MorphoError::snapshot(format!(
                "snapshot has {} polymerases per cell, configuration gives {}",
                snapshot.polymerase_count, grid.polymerase_count
            )));
        }
        if snapshot.cells.len() != grid.cells.len() {
            return Err(MorphoError::snapshot("cell count does not match the grid"));
        }

        for (cell, saved) in grid.cells.iter_mut().zip(&snapshot.cells) {
            cell.restore(saved)?;
        }
        grid.rng = snapshot.rng.clone();
        grid.tick = snapshot.tick;

        tracing::info!(tick = grid.tick, "Grid restored from snapshot");
        Ok(grid)
    }
}
