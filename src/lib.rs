//! morphohw: gene-regulatory morphogenesis for evolvable hardware.
//!
//! The engine lives in `morphohw_core` and its plain records in
//! `morphohw_data`; this crate gathers both under [`model`] and adds
//! versioned snapshot persistence.

pub mod model;
