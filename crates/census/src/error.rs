use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CensusError>;

/// Run-level failures. Every variant aborts the census.
#[derive(Error, Debug)]
pub enum CensusError {
    #[error("Vault does not exist: {}", .0.display())]
    ConfigurationFault(PathBuf),

    #[error("Failed to write manifest {}: {source}", path.display())]
    PersistenceFault {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShardFaultKind {
    /// The record was emitted but carries no description.
    Incomplete,
    /// Reading, fingerprinting or divining failed; no record was emitted.
    Processing { reason: String },
}

/// Diagnostic attached to a single shard. Never aborts the census.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardFault {
    pub relative_path: String,
    pub kind: ShardFaultKind,
}

impl ShardFault {
    pub fn incomplete(relative_path: impl Into<String>) -> Self {
        Self {
            relative_path: relative_path.into(),
            kind: ShardFaultKind::Incomplete,
        }
    }

    pub fn processing(relative_path: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self {
            relative_path: relative_path.into(),
            kind: ShardFaultKind::Processing {
                reason: reason.to_string(),
            },
        }
    }

    #[must_use]
    pub const fn blocks_record(&self) -> bool {
        matches!(self.kind, ShardFaultKind::Processing { .. })
    }
}

impl fmt::Display for ShardFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ShardFaultKind::Incomplete => {
                write!(f, "{}: description is missing", self.relative_path)
            }
            ShardFaultKind::Processing { reason } => {
                write!(f, "{}: processing failed: {reason}", self.relative_path)
            }
        }
    }
}
