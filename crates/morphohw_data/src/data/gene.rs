use super::tf::TfIdentity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of a decoded chromosome feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureKind {
    Promoter,
    Coding,
    EnhancerSite,
    RepressorSite,
}

impl FeatureKind {
    /// Accepts both the short decoder tokens and the spelled-out names.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            "prom" | "promoter" => Some(FeatureKind::Promoter),
            "gene" | "coding" => Some(FeatureKind::Coding),
            "enhb" | "enhancer-site" => Some(FeatureKind::EnhancerSite),
            "repb" | "repressor-site" => Some(FeatureKind::RepressorSite),
            _ => None,
        }
    }
}

/// One record emitted by the genome decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub gene_index: usize,
    pub gene_locus: i64,
    pub kind: FeatureKind,
    /// Signed offset from the gene locus.
    pub offset: i64,
    pub length: i64,
    pub detail: String,
}

/// Morphogen spread extents, one Gray-coded field per direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SpreadCode {
    pub neg_row: u8,
    pub pos_row: u8,
    pub neg_col: u8,
    pub pos_col: u8,
}

/// Internal form of a TF-producing transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TfProduct {
    Local(TfIdentity),
    Cytoplasmic(TfIdentity),
    Morphogen { spread: SpreadCode, sequence: String },
}

/// Value stored in a gene's transcript map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TranscriptProduct {
    /// Opaque command forwarded to the substrate verbatim.
    Configure(String),
    Tf(TfProduct),
}

/// What a bind-site candidate specifier resolves against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindCandidate {
    Tf(TfIdentity),
    /// Resolved by querying the substrate with the full specifier.
    Connection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteCandidate {
    pub specifier: String,
    pub candidate: BindCandidate,
    /// Absolute chromosome locus of the candidate element.
    pub locus: i64,
}

/// An enhancer or repressor binding site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindSite {
    pub locus: i64,
    pub length: i64,
    /// Signed distance metric to the promoter used for activation weighting.
    pub distance: i64,
    /// In insertion order; specifiers are unique.
    pub candidates: Vec<SiteCandidate>,
}

impl BindSite {
    /// Adds a candidate, replacing the locus of an existing specifier in place.
    pub fn insert_candidate(&mut self, specifier: String, candidate: BindCandidate, locus: i64) {
        if let Some(existing) = self.candidates.iter_mut().find(|c| c.specifier == specifier) {
            existing.locus = locus;
            existing.candidate = candidate;
        } else {
            self.candidates.push(SiteCandidate {
                specifier,
                candidate,
                locus,
            });
        }
    }
}

/// Immutable gene decoded from the chromosome, shared by every cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gene {
    pub locus: i64,
    pub coding_length: i64,
    /// `locus + coding_length`; transcription stops once past this locus.
    pub end_locus: i64,
    pub promoter_locus: i64,
    pub promoter_length: i64,
    pub promoter_sequence: String,
    pub transcript: BTreeMap<i64, TranscriptProduct>,
    pub enhancers: Vec<BindSite>,
    pub repressors: Vec<BindSite>,
}

impl Gene {
    #[must_use]
    pub fn product_at(&self, locus: i64) -> Option<&TranscriptProduct> {
        self.transcript.get(&locus)
    }

    /// Lowest start locus among this gene's binding sites.
    #[must_use]
    pub fn first_site_locus(&self) -> Option<i64> {
        self.enhancers
            .iter()
            .chain(&self.repressors)
            .map(|site| site.locus)
            .min()
    }
}
