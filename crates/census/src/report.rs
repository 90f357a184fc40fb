use crate::error::ShardFault;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CensusStatus {
    /// No faults (including an empty vault).
    Clean,
    /// At least one record and at least one fault.
    Partial,
    /// Faults only; the manifest has no records.
    AllFaulted,
}

impl CensusStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Partial => "partial",
            Self::AllFaulted => "all_faulted",
        }
    }
}

/// What a completed census produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CensusReport {
    pub output_path: PathBuf,
    pub format_version: String,
    pub files_scanned: usize,
    pub record_count: usize,
    pub category_counts: BTreeMap<String, usize>,
    pub faults: Vec<ShardFault>,
    pub duration_ms: u64,
}

impl CensusReport {
    #[must_use]
    pub fn status(&self) -> CensusStatus {
        if self.faults.is_empty() {
            CensusStatus::Clean
        } else if self.record_count == 0 {
            CensusStatus::AllFaulted
        } else {
            CensusStatus::Partial
        }
    }

    /// Faults that suppressed a record.
    pub fn blocking_faults(&self) -> impl Iterator<Item = &ShardFault> {
        self.faults.iter().filter(|f| f.blocks_record())
    }
}
