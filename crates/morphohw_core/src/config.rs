//! Configuration management for morphogenesis runs.
//!
//! Every tunable of the engine lives in [`MorphoConfig`], which maps onto a
//! TOML document. Sections that are omitted fall back to their defaults.
//!
//! ## Example `morphohw.toml`
//!
//! ```toml
//! seed = 1113
//!
//! [region]
//! min_row = 5
//! min_col = 5
//! max_row = 8
//! max_col = 6
//! horizontal_granularity = 1
//! vertical_granularity = 2
//!
//! [anchors]
//! inputs = [{ row = 5, col = 5, slice = 0 }]
//! outputs = [{ row = 8, col = 6, slice = 1 }]
//!
//! [expression]
//! polymerase_ratio = 0.7
//! activation_threshold = 0.5
//! transcription_rate = 2
//!
//! [tf]
//! tf_lifespan = 8
//! morphogen_lifespan = 8
//! free_age_rate = 3
//! bound_age_rate = 5
//! propagation_delay = 1
//! ```

use crate::error::{MorphoError, Result};
use crate::region::{Granularity, Region};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Bounds of the substrate region the grid is laid over, in region
/// coordinates, together with how finely each region tile is split.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RegionConfig {
    pub min_row: usize,
    pub min_col: usize,
    pub max_row: usize,
    pub max_col: usize,
    /// 2 = one cell per tile column, 1 = two cells per tile column.
    pub horizontal_granularity: u8,
    /// 2 = one cell per tile row, 1 = two cells per tile row.
    pub vertical_granularity: u8,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            min_row: 5,
            min_col: 5,
            max_row: 8,
            max_col: 6,
            horizontal_granularity: 1,
            vertical_granularity: 2,
        }
    }
}

/// A substrate location in region coordinates. `slice` and `element`
/// default to 0 when the granularity needs them.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionSite {
    pub row: usize,
    pub col: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slice: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<usize>,
}

impl RegionSite {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self {
            row,
            col,
            slice: None,
            element: None,
        }
    }

    #[must_use]
    pub const fn with_slice(mut self, slice: usize) -> Self {
        self.slice = Some(slice);
        self
    }

    #[must_use]
    pub const fn with_element(mut self, element: usize) -> Self {
        self.element = Some(element);
        self
    }
}

/// Cells the update ordering grows from: inputs first, then outputs.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AnchorConfig {
    pub inputs: Vec<RegionSite>,
    pub outputs: Vec<RegionSite>,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            inputs: vec![RegionSite::new(5, 5).with_slice(0)],
            outputs: Vec::new(),
        }
    }
}

/// Gene expression parameters.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ExpressionConfig {
    /// Above 1 this is an absolute polymerase count per cell, otherwise a
    /// fraction of the gene count.
    pub polymerase_ratio: f64,
    /// Probability that an idle polymerase stays idle for a tick.
    pub activation_threshold: f64,
    /// Transcription passes per tick.
    pub transcription_rate: u32,
    /// Genes beyond this many are discarded at load; `None` keeps all.
    pub gene_limit: Option<usize>,
}

impl Default for ExpressionConfig {
    fn default() -> Self {
        Self {
            polymerase_ratio: 0.7,
            activation_threshold: 0.5,
            transcription_rate: 2,
            gene_limit: None,
        }
    }
}

/// Transcription-factor lifetimes and morphogen propagation.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct TfConfig {
    pub tf_lifespan: i64,
    pub morphogen_lifespan: i64,
    pub free_age_rate: i64,
    pub bound_age_rate: i64,
    /// Ticks per unit of Manhattan distance a morphogen travels.
    pub propagation_delay: u32,
}

impl Default for TfConfig {
    fn default() -> Self {
        Self {
            tf_lifespan: 8,
            morphogen_lifespan: 8,
            free_age_rate: 3,
            bound_age_rate: 5,
            propagation_delay: 1,
        }
    }
}

/// Top-level configuration of a morphogenesis run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MorphoConfig {
    /// Seed of the single PRNG owned by the grid.
    pub seed: u64,
    pub region: RegionConfig,
    pub anchors: AnchorConfig,
    pub expression: ExpressionConfig,
    pub tf: TfConfig,
}

impl Default for MorphoConfig {
    fn default() -> Self {
        Self {
            seed: 1113,
            region: RegionConfig::default(),
            anchors: AnchorConfig::default(),
            expression: ExpressionConfig::default(),
            tf: TfConfig::default(),
        }
    }
}

fn ensure(condition: bool, message: &str) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(MorphoError::config(message))
    }
}

impl MorphoConfig {
    /// Validates every section, including that each anchor lands in the grid.
    pub fn validate(&self) -> Result<()> {
        let region = self.region()?;

        ensure(
            !self.anchors.inputs.is_empty() || !self.anchors.outputs.is_empty(),
            "At least one input or output anchor is required",
        )?;
        for site in self.anchors.inputs.iter().chain(&self.anchors.outputs) {
            region.cell_for(site)?;
        }

        let expr = &self.expression;
        ensure(
            expr.polymerase_ratio.is_finite(),
            "Polymerase ratio must be finite",
        )?;
        ensure(
            (0.0..=1.0).contains(&expr.activation_threshold),
            "Activation threshold must be in [0.0, 1.0]",
        )?;
        ensure(
            expr.transcription_rate > 0,
            "Transcription rate must be positive",
        )?;

        let tf = &self.tf;
        ensure(tf.tf_lifespan > 0, "TF lifespan must be positive")?;
        ensure(
            tf.morphogen_lifespan > 0,
            "Morphogen lifespan must be positive",
        )?;
        ensure(tf.free_age_rate >= 0, "Free age rate must be non-negative")?;
        ensure(tf.bound_age_rate >= 0, "Bound age rate must be non-negative")?;

        Ok(())
    }

    /// Region geometry described by this configuration.
    pub fn region(&self) -> Result<Region> {
        let r = &self.region;
        ensure(
            r.max_row >= r.min_row && r.max_col >= r.min_col,
            "Region maximum must not be below its minimum",
        )?;
        let granularity =
            Granularity::from_factors(r.horizontal_granularity, r.vertical_granularity)?;
        Ok(Region::new(
            r.min_row,
            r.min_col,
            r.max_row,
            r.max_col,
            granularity,
        ))
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| MorphoError::config(e.to_string()))
    }
}
