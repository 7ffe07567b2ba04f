//! Core data structures for the morphohw simulation.

pub mod coord;
pub mod gene;
pub mod snapshot;
pub mod tf;
