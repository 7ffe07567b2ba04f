//! Morphogen spread decoding and delivery planning.
//!
//! A morphogen product names an 8-symbol binary spread code. It is read as
//! four Gray-coded 2-symbol fields giving how far the morphogen reaches in
//! each direction:
//!
//! | field | direction |
//! |---|---|
//! | 0 | toward lower rows |
//! | 1 | toward higher rows |
//! | 2 | toward lower columns |
//! | 3 | toward higher columns |
//!
//! Cells reached are the source, both axes, then the four diagonal
//! quadrants filled as triangles bounded by the smaller of the two extents.
//! Each target receives a copy whose distance encoding is a fresh random
//! bit string as long as the Manhattan distance, released after
//! `distance * propagation_delay` TF updates.

use crate::config::TfConfig;
use morphohw_data::{CellCoord, SpreadCode, TfIdentity};
use rand::Rng;

/// Decodes an 8-symbol binary spread code. Returns `None` when the code is
/// the wrong length or contains anything other than `0` and `1`.
#[must_use]
pub fn decode_spread(code: &str) -> Option<SpreadCode> {
    let bytes = code.trim().as_bytes();
    if bytes.len() != 8 {
        return None;
    }
    let mut fields = [0u8; 4];
    for (field, pair) in fields.iter_mut().zip(bytes.chunks(2)) {
        *field = match pair {
            b"00" => 0,
            b"01" => 1,
            b"11" => 2,
            b"10" => 3,
            _ => return None,
        };
    }
    Some(SpreadCode {
        neg_row: fields[0],
        pos_row: fields[1],
        neg_col: fields[2],
        pos_col: fields[3],
    })
}

/// Grid dimensions used to clip spreads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDims {
    pub rows: usize,
    pub cols: usize,
}

impl GridDims {
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    #[must_use]
    pub fn contains(&self, coord: CellCoord) -> bool {
        coord.row < self.rows && coord.col < self.cols
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    fn offset(&self, source: CellCoord, dy: i64, dx: i64) -> Option<CellCoord> {
        let row = usize::try_from(source.row as i64 + dy).ok()?;
        let col = usize::try_from(source.col as i64 + dx).ok()?;
        let coord = CellCoord::new(row, col);
        self.contains(coord).then_some(coord)
    }
}

/// Cells reached by a spread from `source`, in delivery order, clipped to
/// the grid.
#[must_use]
pub fn spread_targets(source: CellCoord, spread: SpreadCode, dims: GridDims) -> Vec<CellCoord> {
    let rn = i64::from(spread.neg_row);
    let rp = i64::from(spread.pos_row);
    let cn = i64::from(spread.neg_col);
    let cp = i64::from(spread.pos_col);

    let mut offsets = vec![(0, 0)];
    offsets.extend((-rn..=rp).filter(|&y| y != 0).map(|y| (y, 0)));
    offsets.extend((-cn..=cp).filter(|&x| x != 0).map(|x| (0, x)));

    let quadrants = [
        (-1, -1, rn.min(cn)),
        (1, -1, rp.min(cn)),
        (-1, 1, rn.min(cp)),
        (1, 1, rp.min(cp)),
    ];
    for (sy, sx, extent) in quadrants {
        for y in 1..=extent {
            for x in 1..=(extent - y) {
                offsets.push((sy * y, sx * x));
            }
        }
    }

    offsets
        .into_iter()
        .filter_map(|(dy, dx)| dims.offset(source, dy, dx))
        .collect()
}

/// A morphogen copy on its way to one target cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MorphogenDelivery {
    pub target: CellCoord,
    pub countdown: usize,
    pub identity: TfIdentity,
    pub locus: i64,
    pub ttl: i64,
}

/// Random bit string of the given length, one PRNG draw per bit.
pub fn random_distance_code<R: Rng + ?Sized>(rng: &mut R, bits: usize) -> String {
    (0..bits)
        .map(|_| if rng.gen::<bool>() { '1' } else { '0' })
        .collect()
}

/// Plans every delivery of one morphogen emission. PRNG draws happen in
/// target order.
pub fn plan_deliveries<R: Rng + ?Sized>(
    rng: &mut R,
    source: CellCoord,
    spread: SpreadCode,
    sequence: &str,
    locus: i64,
    dims: GridDims,
    tf: &TfConfig,
) -> Vec<MorphogenDelivery> {
    spread_targets(source, spread, dims)
        .into_iter()
        .map(|target| {
            let distance = source.manhattan(target);
            MorphogenDelivery {
                target,
                countdown: distance * tf.propagation_delay as usize,
                identity: TfIdentity::new(random_distance_code(rng, distance), sequence),
                locus,
                ttl: tf.morphogen_lifespan,
            }
        })
        .collect()
}
