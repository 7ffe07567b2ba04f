//! Parsing of feature detail strings into transcript products and bind-site
//! candidates.
//!
//! A detail string is a `;`-separated list of `offset,length,payload`
//! elements. Payloads of the form `TF=<type>,<field>,<sequence>` are handled
//! by the engine; everything else belongs to the substrate and stays opaque.

use crate::morphogen::decode_spread;
use morphohw_data::{BindCandidate, TfIdentity, TfKind, TfProduct, TranscriptProduct};

/// One `offset,length,payload` element of a detail string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailElement<'a> {
    pub offset: i64,
    pub length: i64,
    pub payload: &'a str,
}

/// Splits a detail string into elements. Empty elements are skipped.
pub fn parse_elements(detail: &str) -> Result<Vec<DetailElement<'_>>, String> {
    detail
        .split(';')
        .map(str::trim)
        .filter(|element| !element.is_empty())
        .map(|element| {
            let mut fields = element.splitn(3, ',');
            let (Some(offset), Some(length), Some(payload)) =
                (fields.next(), fields.next(), fields.next())
            else {
                return Err(format!(
                    "element '{element}' needs offset, length and payload"
                ));
            };
            Ok(DetailElement {
                offset: parse_int(offset, "element offset")?,
                length: parse_int(length, "element length")?,
                payload: payload.trim(),
            })
        })
        .collect()
}

pub(crate) fn parse_int(field: &str, what: &str) -> Result<i64, String> {
    let field = field.trim();
    field
        .strip_prefix('+')
        .unwrap_or(field)
        .parse::<i64>()
        .map_err(|_| format!("invalid {what} '{field}'"))
}

/// Splits `TF=a,b,c` into its three fields; `None` if the payload is not a TF.
fn tf_fields(payload: &str) -> Option<Result<[&str; 3], String>> {
    let (key, rest) = payload.split_once('=')?;
    if key.trim() != "TF" {
        return None;
    }
    let mut fields = rest.splitn(3, ',').map(str::trim);
    Some(match (fields.next(), fields.next(), fields.next()) {
        (Some(kind), Some(middle), Some(sequence)) => Ok([kind, middle, sequence]),
        _ => Err(format!("TF payload '{payload}' needs type, field and sequence")),
    })
}

/// Parses a coding-region payload.
pub fn parse_product(payload: &str) -> Result<TranscriptProduct, String> {
    let Some(fields) = tf_fields(payload) else {
        return Ok(TranscriptProduct::Configure(payload.trim().to_string()));
    };
    let [kind, middle, sequence] = fields?;

    let product = match TfKind::from_tag(kind) {
        TfKind::Morphogen => {
            let spread = decode_spread(middle)
                .ok_or_else(|| format!("invalid morphogen spread code '{middle}'"))?;
            TfProduct::Morphogen {
                spread,
                sequence: sequence.to_string(),
            }
        }
        TfKind::Cytoplasmic => TfProduct::Cytoplasmic(TfIdentity::new(middle, sequence)),
        TfKind::Local => TfProduct::Local(TfIdentity::new(middle, sequence)),
    };
    Ok(TranscriptProduct::Tf(product))
}

/// Parses a bind-site candidate specifier. The TF type is not part of the
/// identity a candidate binds.
pub fn parse_candidate(specifier: &str) -> Result<BindCandidate, String> {
    match tf_fields(specifier) {
        None => Ok(BindCandidate::Connection),
        Some(fields) => {
            let [_, distance, sequence] = fields?;
            Ok(BindCandidate::Tf(TfIdentity::new(distance, sequence)))
        }
    }
}
