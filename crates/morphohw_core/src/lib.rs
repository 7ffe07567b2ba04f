//! # morphohw Core
//!
//! A discrete morphogenesis engine for evolvable hardware: a decoded
//! chromosome drives a gene-regulatory network in every cell of a grid, and
//! the genes it expresses read and write the configuration of an external
//! substrate.
//!
//! This crate contains the deterministic simulation logic, including:
//! - Chromosome loading into immutable genes
//! - Per-cell transcription-factor pools with aging and binding
//! - Morphogen spread across neighbouring cells
//! - Polymerase recruitment and transcription
//! - Grid ordering, ticking and full-state snapshots
//! - Metrics collection and structured logging
//!
//! ## Determinism
//!
//! Each grid owns one seeded `ChaCha8Rng`. Given the same seed, chromosome,
//! configuration and substrate answers, two runs issue identical substrate
//! calls in identical order.
//!
//! ## Example
//!
//! ```
//! use morphohw_core::config::{MorphoConfig, RegionConfig, RegionSite};
//! use morphohw_core::grid::Grid;
//! use morphohw_core::substrate::NullSubstrate;
//!
//! let mut config = MorphoConfig::default();
//! config.region = RegionConfig {
//!     min_row: 0,
//!     min_col: 0,
//!     max_row: 1,
//!     max_col: 1,
//!     horizontal_granularity: 2,
//!     vertical_granularity: 2,
//! };
//! config.anchors.inputs = vec![RegionSite::new(0, 0)];
//!
//! let chromosome = "0,10: prom,-4,2: AC\n0,10: gene,0,2: 0,1,lut=0110\n";
//! let mut grid = Grid::from_text(config, chromosome).unwrap();
//! grid.step_n(5, &mut NullSubstrate).unwrap();
//! assert_eq!(grid.tick(), 5);
//! ```

/// Per-cell state and the five-phase gene-regulatory step
pub mod cell;
/// Chromosome loading from decoded feature records
pub mod chromosome;
/// Configuration management for run parameters
pub mod config;
/// Cytoplasmic determinants applied before the first tick
pub mod determinants;
/// Error types
pub mod error;
/// Expression state of a single gene
pub mod gene_state;
/// Grid orchestration, ticking and snapshots
pub mod grid;
/// Performance metrics collection and logging
pub mod metrics;
/// Morphogen spread decoding and delivery planning
pub mod morphogen;
/// Cell visitation order
pub mod ordering;
/// RNA polymerase cursors
pub mod polymerase;
/// Region coordinates to grid cells
pub mod region;
/// Full-state grid snapshots
pub mod snapshot;
/// The external substrate boundary
pub mod substrate;
/// Transcription-factor pools
pub mod tf_pool;
/// Detail string parsing for products and bind candidates
pub mod transcript;

pub use chromosome::Chromosome;
pub use config::MorphoConfig;
pub use error::{MorphoError, Result};
pub use grid::Grid;
pub use metrics::{init_logging, Metrics};
pub use snapshot::GridSnapshot;
pub use substrate::{NullSubstrate, Substrate, SubstrateError};
