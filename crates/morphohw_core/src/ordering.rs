//! Cell visitation order.
//!
//! Cells are visited starting from the input anchors, then the output
//! anchors, then outward in rings: each pass expands only the cells that
//! were already ordered when the pass began.

use crate::error::{MorphoError, Result};
use crate::morphogen::GridDims;
use morphohw_data::CellCoord;

/// Neighbour offsets in expansion order, starting east and turning
/// counter-clockwise.
const NEIGHBOURS: [(i64, i64); 8] = [
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellOrdering {
    dims: GridDims,
    order: Vec<CellCoord>,
    /// Row-major: position of each cell in `order`.
    positions: Vec<usize>,
}

impl CellOrdering {
    pub fn compute(dims: GridDims, inputs: &[CellCoord], outputs: &[CellCoord]) -> Result<Self> {
        if inputs.is_empty() && outputs.is_empty() {
            return Err(MorphoError::config("update ordering needs at least one anchor"));
        }

        let total = dims.cell_count();
        let mut positions = vec![usize::MAX; total];
        let mut order = Vec::with_capacity(total);

        for &anchor in inputs.iter().chain(outputs) {
            if !dims.contains(anchor) {
                return Err(MorphoError::config(format!(
                    "anchor {anchor} lies outside the {}x{} grid",
                    dims.rows, dims.cols
                )));
            }
            let slot = &mut positions[anchor.row * dims.cols + anchor.col];
            if *slot == usize::MAX {
                *slot = order.len();
                order.push(anchor);
            }
        }

        let mut frontier = 0;
        while order.len() < total {
            let end = order.len();
            for i in frontier..end {
                let cell = order[i];
                for (dy, dx) in NEIGHBOURS {
                    let (Ok(row), Ok(col)) = (
                        usize::try_from(cell.row as i64 + dy),
                        usize::try_from(cell.col as i64 + dx),
                    ) else {
                        continue;
                    };
                    let next = CellCoord::new(row, col);
                    if !dims.contains(next) {
                        continue;
                    }
                    let slot = &mut positions[row * dims.cols + col];
                    if *slot == usize::MAX {
                        *slot = order.len();
                        order.push(next);
                    }
                }
            }
            if order.len() == end {
                return Err(MorphoError::contract("update ordering stalled"));
            }
            frontier = end;
        }

        Ok(Self {
            dims,
            order,
            positions,
        })
    }

    /// Cells in visitation order.
    #[must_use]
    pub fn order(&self) -> &[CellCoord] {
        &self.order
    }

    /// Where `coord` falls in the visitation order.
    #[must_use]
    pub fn position(&self, coord: CellCoord) -> Option<usize> {
        self.dims
            .contains(coord)
            .then(|| self.positions[coord.row * self.dims.cols + coord.col])
    }

    /// The order as a row-major matrix of visitation positions.
    #[must_use]
    pub fn matrix(&self) -> Vec<Vec<usize>> {
        self.positions
            .chunks(self.dims.cols.max(1))
            .map(<[usize]>::to_vec)
            .collect()
    }
}
