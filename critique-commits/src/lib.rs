//! Durable per-commit review archive: atomic directory writes, walked for
//! `List`/`Recall` rather than indexed in a database (history search already
//! lives in `critique-history`).

pub mod errors;
pub mod model;
pub mod store;

pub use errors::{CommitStoreError, CommitStoreResult};
pub use model::{AnalysisContext, AnalyzedFile, ArchiveSummary, CommitAnalysis, CommitSummary, Recommendation, RecallQuery, SeverityHistogram};
pub use store::CommitStore;
