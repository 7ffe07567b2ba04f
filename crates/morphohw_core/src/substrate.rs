//! Boundary to the external configurable substrate.
//!
//! The engine never interprets configuration commands or connection
//! specifiers; both pass through as opaque strings.

use std::error::Error;
use thiserror::Error;

/// Failure reported by a [`Substrate`] implementation.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct SubstrateError {
    message: String,
    #[source]
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl SubstrateError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: Error + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// The collaborator a grid drives: it applies configuration commands and
/// answers whether a connection specifier is currently present.
pub trait Substrate {
    /// Applies an opaque configuration command to the cell at `(row, col)`.
    fn configure(&mut self, row: usize, col: usize, command: &str) -> Result<(), SubstrateError>;

    /// Reports whether the connection named by `specifier` exists for the
    /// cell. `locus` is the chromosome position of the querying element.
    fn query_binding(
        &self,
        row: usize,
        col: usize,
        specifier: &str,
        locus: i64,
    ) -> Result<bool, SubstrateError>;
}

impl<S: Substrate + ?Sized> Substrate for &mut S {
    fn configure(&mut self, row: usize, col: usize, command: &str) -> Result<(), SubstrateError> {
        (**self).configure(row, col, command)
    }

    fn query_binding(
        &self,
        row: usize,
        col: usize,
        specifier: &str,
        locus: i64,
    ) -> Result<bool, SubstrateError> {
        (**self).query_binding(row, col, specifier, locus)
    }
}

/// Accepts every command and never reports a connection.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSubstrate;

impl Substrate for NullSubstrate {
    fn configure(&mut self, _row: usize, _col: usize, _command: &str) -> Result<(), SubstrateError> {
        Ok(())
    }

    fn query_binding(
        &self,
        _row: usize,
        _col: usize,
        _specifier: &str,
        _locus: i64,
    ) -> Result<bool, SubstrateError> {
        Ok(false)
    }
}
