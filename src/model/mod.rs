pub use morphohw_core::{init_logging, Grid, MorphoConfig, MorphoError, NullSubstrate, Substrate};
pub mod cell {
    pub use morphohw_core::cell::*;
}
pub mod chromosome {
    pub use morphohw_core::chromosome::*;
}
pub mod config {
    pub use morphohw_core::config::*;
}
pub mod determinants {
    pub use morphohw_core::determinants::*;
}
pub mod error {
    pub use morphohw_core::error::*;
}
pub mod gene_state {
    pub use morphohw_core::gene_state::*;
}
pub mod grid {
    pub use morphohw_core::grid::*;
}
pub mod metrics {
    pub use morphohw_core::metrics::*;
}
pub mod morphogen {
    pub use morphohw_core::morphogen::*;
}
pub mod ordering {
    pub use morphohw_core::ordering::*;
}
pub mod polymerase {
    pub use morphohw_core::polymerase::*;
}
pub mod region {
    pub use morphohw_core::region::*;
}
pub mod snapshot {
    pub use morphohw_core::snapshot::*;
}
pub mod substrate {
    pub use morphohw_core::substrate::*;
}
pub mod tf_pool {
    pub use morphohw_core::tf_pool::*;
}
pub mod transcript {
    pub use morphohw_core::transcript::*;
}

pub mod state {
    pub use morphohw_data::*;
}

pub mod persistence;
