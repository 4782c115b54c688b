//! Bulk import of processor operations from tab-separated text
//!
//! Pipeline: parse ([`tsv`]) → validate ([`validate`]) → reconcile against
//! the stored collection ([`reconcile`]) → per-key create/update decisions
//! ([`modes`]) → one commit through an [`OperationStore`] ([`commit`]).
//! [`ImportSession`] ties the stages together for an interactive wizard.

pub mod types;
pub mod error;
pub mod tsv;
pub mod validate;
pub mod reconcile;
pub mod modes;
pub mod commit;
pub mod report;
pub mod session;

pub use types::*;
pub use error::ImportError;
pub use tsv::{export_snapshot, export_tsv, parse_tsv};
pub use validate::{validate_rows, validate_text};
pub use reconcile::{reconcile, Candidate, MatchedRecord, ReconciliationResult};
pub use modes::ModeMap;
pub use commit::{commit, CommitSummary, ImportPlan, OperationStore};
pub use report::{build_preview, PreviewReport, PreviewRow, RowStatus};
pub use session::{ImportSession, ImportStep};
