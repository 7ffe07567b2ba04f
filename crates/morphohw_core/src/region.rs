//! Mapping between substrate region coordinates and grid cells.
//!
//! A region tile can hold one cell, one cell per slice (two across), or one
//! cell per logic element (two across, two down).

use crate::config::RegionSite;
use crate::error::{MorphoError, Result};
use morphohw_data::CellCoord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Granularity {
    /// One cell per tile.
    Clb,
    /// One cell per slice, two slices side by side.
    Slice,
    /// One cell per logic element, two by two.
    LogicElement,
}

impl Granularity {
    /// Builds the granularity from horizontal and vertical factors.
    /// Only (2,2), (1,2) and (1,1) describe a real layout.
    pub fn from_factors(horizontal: u8, vertical: u8) -> Result<Self> {
        match (horizontal, vertical) {
            (2, 2) => Ok(Granularity::Clb),
            (1, 2) => Ok(Granularity::Slice),
            (1, 1) => Ok(Granularity::LogicElement),
            (h, v) => Err(MorphoError::config(format!(
                "unsupported granularity: horizontal {h}, vertical {v}"
            ))),
        }
    }

    /// Cells per tile across.
    #[must_use]
    pub fn horizontal_cells(self) -> usize {
        match self {
            Granularity::Clb => 1,
            Granularity::Slice | Granularity::LogicElement => 2,
        }
    }

    /// Cells per tile down.
    #[must_use]
    pub fn vertical_cells(self) -> usize {
        match self {
            Granularity::Clb | Granularity::Slice => 1,
            Granularity::LogicElement => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    min_row: usize,
    min_col: usize,
    max_row: usize,
    max_col: usize,
    granularity: Granularity,
}

impl Region {
    #[must_use]
    pub fn new(
        min_row: usize,
        min_col: usize,
        max_row: usize,
        max_col: usize,
        granularity: Granularity,
    ) -> Self {
        Self {
            min_row,
            min_col,
            max_row,
            max_col,
            granularity,
        }
    }

    #[must_use]
    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        (self.max_row - self.min_row + 1) * self.granularity.vertical_cells()
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        (self.max_col - self.min_col + 1) * self.granularity.horizontal_cells()
    }

    /// Converts a region site into the grid cell it covers.
    pub fn cell_for(&self, site: &RegionSite) -> Result<CellCoord> {
        if !(self.min_row..=self.max_row).contains(&site.row)
            || !(self.min_col..=self.max_col).contains(&site.col)
        {
            return Err(MorphoError::config(format!(
                "site ({},{}) lies outside region ({},{})-({},{})",
                site.row, site.col, self.min_row, self.min_col, self.max_row, self.max_col
            )));
        }

        let slice = site.slice.unwrap_or(0);
        let element = site.element.unwrap_or(0);
        if slice > 1 || element > 1 {
            return Err(MorphoError::config(format!(
                "site ({},{}) has slice {slice} / element {element}, expected 0 or 1",
                site.row, site.col
            )));
        }

        let row = site.row - self.min_row;
        let col = site.col - self.min_col;
        let coord = match self.granularity {
            Granularity::Clb => CellCoord::new(row, col),
            Granularity::Slice => CellCoord::new(row, col * 2 + slice),
            Granularity::LogicElement => CellCoord::new(row * 2 + element, col * 2 + slice),
        };
        Ok(coord)
    }
}
