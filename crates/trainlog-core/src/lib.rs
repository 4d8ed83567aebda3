//! trainlog-core: record store, metrics engine and spreadsheet ingestor for
//! a personal workout log.
//!
//! Sets are appended to a flat CSV store; every read recomputes the weekly
//! summary from the full store with `compute_summary()`.

pub mod dashboard;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod models;
pub mod session;
pub mod storage;

pub use dashboard::{Headline, WeekFilter};
pub use engine::compute_summary;
pub use error::{Result, TrainlogError};
pub use ingest::{IngestIssue, IngestProblem, IngestReport, Ingestor, Sheet};
pub use models::{ImportedSet, SetRecord, SummaryRecord, TrainlogConfig, WeekLabel};
pub use session::{PendingSet, Session};
