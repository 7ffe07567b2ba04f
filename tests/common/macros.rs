/// Asserts how many times a cell received a configuration command.
#[macro_export]
macro_rules! assert_configured {
    ($substrate:expr, $row:expr, $col:expr, $command:expr, $times:expr) => {
        assert_eq!(
            $substrate.count($row, $col, $command),
            $times,
            "Cell ({},{}) should have received {:?} {} time(s), log: {:?}",
            $row,
            $col,
            $command,
            $times,
            $substrate.commands_at($row, $col)
        );
    };
}

/// Asserts that a gene is not being transcribed in the given cell.
#[macro_export]
macro_rules! assert_gene_free {
    ($grid:expr, $row:expr, $col:expr, $gene:expr) => {
        let cell = $grid.cell($row, $col).expect("Cell out of range");
        assert!(
            cell.genes()[$gene].is_free(),
            "Gene {} of cell ({},{}) is still transcribing",
            $gene,
            $row,
            $col
        );
    };
}

/// Asserts that a gene is being transcribed in the given cell.
#[macro_export]
macro_rules! assert_gene_transcribing {
    ($grid:expr, $row:expr, $col:expr, $gene:expr) => {
        let cell = $grid.cell($row, $col).expect("Cell out of range");
        assert!(
            !cell.genes()[$gene].is_free(),
            "Gene {} of cell ({},{}) is not transcribing",
            $gene,
            $row,
            $col
        );
    };
}
