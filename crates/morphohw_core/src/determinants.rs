//! Cytoplasmic determinants: products placed into specific cells before
//! the first tick.
//!
//! One determinant per line, `row,col: payload`, where the payload uses the
//! same syntax as a coding-region product. Blank lines and `#` comments are
//! ignored.

use crate::error::{MorphoError, Result};
use crate::transcript::{parse_int, parse_product};
use morphohw_data::{CellCoord, TranscriptProduct};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Determinant {
    pub line: usize,
    pub coord: CellCoord,
    pub product: TranscriptProduct,
}

pub fn parse_determinants(text: &str) -> Result<Vec<Determinant>> {
    let mut determinants = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let (position, payload) = trimmed
            .split_once(':')
            .ok_or_else(|| MorphoError::determinant(line, "expected 'row,col: payload'"))?;
        let (row, col) = position
            .split_once(',')
            .ok_or_else(|| MorphoError::determinant(line, "expected 'row,col'"))?;
        let coordinate = |field: &str, what: &str| -> Result<usize> {
            let value = parse_int(field, what).map_err(|e| MorphoError::determinant(line, e))?;
            usize::try_from(value)
                .map_err(|_| MorphoError::determinant(line, format!("negative {what} {value}")))
        };
        let coord = CellCoord::new(coordinate(row, "row")?, coordinate(col, "column")?);
        let product = parse_product(payload).map_err(|e| MorphoError::determinant(line, e))?;
        determinants.push(Determinant {
            line,
            coord,
            product,
        });
    }
    Ok(determinants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use morphohw_data::{TfIdentity, TfProduct};

    #[test]
    fn test_parse_determinants() {
        let text = "# seeds\n0,1: TF=cyto,01,AC\n\n2,0: lut=0110\n";
        let parsed = parse_determinants(text).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].coord, CellCoord::new(0, 1));
        assert_eq!(
            parsed[0].product,
            TranscriptProduct::Tf(TfProduct::Cytoplasmic(TfIdentity::new("01", "AC")))
        );
        assert_eq!(parsed[1].line, 4);
        assert_eq!(
            parsed[1].product,
            TranscriptProduct::Configure("lut=0110".into())
        );
    }

    #[test]
    fn test_malformed_determinant_reports_line() {
        assert!(matches!(
            parse_determinants("0,0: X\n-1,0: X\n"),
            Err(MorphoError::Determinant { line: 2, .. })
        ));
        assert!(matches!(
            parse_determinants("0 0 X"),
            Err(MorphoError::Determinant { line: 1, .. })
        ));
    }
}
