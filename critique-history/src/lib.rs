//! Durable review history: SQLite-backed record of past issues, searchable
//! by full text, file, author, severity, and time range.

pub mod db;
pub mod errors;
pub mod model;
pub mod schema;
pub mod store;

pub use errors::{HistoryError, HistoryResult};
pub use model::{FileHistory, GlobalStats, HistoryRecord, SearchQuery, SeverityDistribution, TypeDistribution};
pub use store::HistoryStore;
