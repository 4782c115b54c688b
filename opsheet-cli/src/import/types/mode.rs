//! Per-candidate import decision

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether an imported row writes a new operation or overwrites a matched one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    #[default]
    Create,
    Update,
}

impl ImportMode {
    /// The other mode
    pub fn toggled(self) -> Self {
        match self {
            ImportMode::Create => ImportMode::Update,
            ImportMode::Update => ImportMode::Create,
        }
    }

    /// Get display label for UI
    pub fn label(&self) -> &'static str {
        match self {
            ImportMode::Create => "Create",
            ImportMode::Update => "Update",
        }
    }
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportMode::Create => write!(f, "create"),
            ImportMode::Update => write!(f, "update"),
        }
    }
}
