//! Plain data records shared by the morphohw engine and its snapshots.

pub mod data;

pub use data::coord::CellCoord;
pub use data::gene::{
    BindCandidate, BindSite, FeatureKind, FeatureRecord, Gene, SiteCandidate, SpreadCode,
    TfProduct, TranscriptProduct,
};
pub use data::snapshot::{
    BoundTfEntry, CellSnapshot, FreeTfEntry, GeneStateSnapshot, PendingTfEntry,
    PolymeraseSnapshot, TfPoolSnapshot,
};
pub use data::tf::{Lifespan, TfIdentity, TfKind, TfRecord, UNPLACED_LOCUS};
