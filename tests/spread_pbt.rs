use morphohw_lib::model::morphogen::{decode_spread, spread_targets, GridDims};
use morphohw_lib::model::ordering::CellOrdering;
use morphohw_lib::model::state::CellCoord;
use proptest::prelude::*;
use std::collections::HashSet;

fn spread_code() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::bool::ANY, 8)
        .prop_map(|bits| bits.into_iter().map(|b| if b { '1' } else { '0' }).collect())
}

proptest! {
    #[test]
    fn test_spread_targets_stay_in_grid_and_are_unique(
        rows in 1usize..9,
        cols in 1usize..9,
        row_seed in 0usize..64,
        col_seed in 0usize..64,
        code in spread_code(),
    ) {
        let dims = GridDims::new(rows, cols);
        let source = CellCoord::new(row_seed % rows, col_seed % cols);
        let spread = decode_spread(&code).unwrap();
        let targets = spread_targets(source, spread, dims);

        prop_assert_eq!(targets.first().copied(), Some(source));
        let unique: HashSet<_> = targets.iter().copied().collect();
        prop_assert_eq!(unique.len(), targets.len());
        for target in &targets {
            prop_assert!(dims.contains(*target));
            let dy = target.row.abs_diff(source.row);
            let dx = target.col.abs_diff(source.col);
            let rows_reach = if target.row < source.row { spread.neg_row } else { spread.pos_row };
            let cols_reach = if target.col < source.col { spread.neg_col } else { spread.pos_col };
            prop_assert!(dy <= usize::from(rows_reach));
            prop_assert!(dx <= usize::from(cols_reach));
        }
    }

    #[test]
    fn test_unclipped_spread_size(code in spread_code()) {
        let dims = GridDims::new(7, 7);
        let source = CellCoord::new(3, 3);
        let spread = decode_spread(&code).unwrap();
        let (rn, rp) = (usize::from(spread.neg_row), usize::from(spread.pos_row));
        let (cn, cp) = (usize::from(spread.neg_col), usize::from(spread.pos_col));
        // Each diagonal quadrant holds the cells strictly inside the
        // triangle bounded by the shorter of its two arms.
        let quadrant = |e: usize| e * e.saturating_sub(1) / 2;
        let expected = 1
            + rn + rp + cn + cp
            + quadrant(rn.min(cn))
            + quadrant(rp.min(cn))
            + quadrant(rn.min(cp))
            + quadrant(rp.min(cp));
        prop_assert_eq!(spread_targets(source, spread, dims).len(), expected);
    }

    #[test]
    fn test_ordering_is_a_permutation(
        rows in 1usize..8,
        cols in 1usize..8,
        anchors in prop::collection::vec((0usize..8, 0usize..8), 1..4),
    ) {
        let dims = GridDims::new(rows, cols);
        let inputs: Vec<CellCoord> = anchors
            .iter()
            .map(|&(r, c)| CellCoord::new(r % rows, c % cols))
            .collect();
        let ordering = CellOrdering::compute(dims, &inputs, &[]).unwrap();

        prop_assert_eq!(ordering.order().len(), rows * cols);
        let unique: HashSet<_> = ordering.order().iter().copied().collect();
        prop_assert_eq!(unique.len(), rows * cols);
        prop_assert_eq!(ordering.order()[0], inputs[0]);
        for (position, coord) in ordering.order().iter().enumerate() {
            prop_assert_eq!(ordering.position(*coord), Some(position));
        }
    }
}

#[test]
fn test_malformed_spread_codes_are_rejected() {
    assert!(decode_spread("0101").is_none());
    assert!(decode_spread("0101010x").is_none());
    assert!(decode_spread("010101011").is_none());
}
