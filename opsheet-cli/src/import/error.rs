//! Errors raised by the import engine

use std::time::Duration;

use thiserror::Error;

use super::types::{CandidateKey, RecordId};

/// Failures that stop an import.
///
/// Bad rows are not errors: they are reported on `CandidateRow::errors`.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Header row missing or not understood
    #[error("line {line}: {message}")]
    Structural { line: usize, message: String },

    /// Commit requested before the session reached the preview step
    #[error("import is not ready to commit (step: {0})")]
    NotReady(String),

    /// The store did not answer in time; nothing was committed
    #[error("import timed out after {0:?}")]
    Timeout(Duration),

    /// A matched operation disappeared between reconciliation and commit
    #[error("operation '{key}' ({id}) no longer exists; reload and validate again")]
    Conflict { key: CandidateKey, id: RecordId },

    /// The store rejected the commit
    #[error("import failed: {0}")]
    Store(String),

    /// A store without transactions stopped part way through
    #[error("import stopped after {created} created and {updated} updated: {cause}")]
    Partial {
        created: usize,
        updated: usize,
        cause: String,
    },
}

impl ImportError {
    pub fn structural(line: usize, message: impl Into<String>) -> Self {
        ImportError::Structural {
            line,
            message: message.into(),
        }
    }

    /// Wrap any store failure, keeping the full cause chain
    pub fn store(err: impl std::fmt::Display) -> Self {
        ImportError::Store(format!("{:#}", err))
    }
}
