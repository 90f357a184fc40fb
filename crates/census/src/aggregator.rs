use crate::error::ShardFault;
use crate::processor::{ShardOutcome, ShardRecord};
use serde::Serialize;
use std::collections::BTreeMap;

pub const MANIFEST_FORMAT_VERSION: &str = "2.0.0";

/// The published index document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Manifest {
    #[serde(rename = "version")]
    pub format_version: String,
    /// Unix seconds, fractional.
    #[serde(rename = "timestamp")]
    pub generated_at: f64,
    #[serde(rename = "repo")]
    pub source_repository: String,
    #[serde(rename = "branch")]
    pub source_branch: String,
    #[serde(rename = "count")]
    pub record_count: usize,
    #[serde(rename = "archetypes")]
    pub records: Vec<ShardRecord>,
}

/// Diagnostics that accompany a manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CensusTally {
    pub files_seen: usize,
    pub category_counts: BTreeMap<String, usize>,
    pub faults: Vec<ShardFault>,
}

/// Folds per-shard outcomes into a manifest.
///
/// Ordering is decided in [`CensusAggregator::finish`], so the result does not
/// depend on the order outcomes were absorbed in.
pub struct CensusAggregator {
    repo: String,
    branch: String,
    records: Vec<ShardRecord>,
    tally: CensusTally,
}

impl CensusAggregator {
    pub fn new(repo: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            branch: branch.into(),
            records: Vec::new(),
            tally: CensusTally::default(),
        }
    }

    pub fn absorb(&mut self, outcome: ShardOutcome) {
        self.tally.files_seen += 1;
        match outcome {
            ShardOutcome::Complete(record) => self.push_record(record),
            ShardOutcome::Incomplete { record, fault } => {
                self.push_record(record);
                self.tally.faults.push(fault);
            }
            ShardOutcome::Failed(fault) => self.tally.faults.push(fault),
        }
    }

    fn push_record(&mut self, record: ShardRecord) {
        *self
            .tally
            .category_counts
            .entry(record.category.clone())
            .or_default() += 1;
        self.records.push(record);
    }

    #[must_use]
    pub fn finish(self, generated_at: f64) -> (Manifest, CensusTally) {
        let Self {
            repo,
            branch,
            mut records,
            mut tally,
        } = self;

        records.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.relative_path.cmp(&b.relative_path))
        });
        tally
            .faults
            .sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

        let manifest = Manifest {
            format_version: MANIFEST_FORMAT_VERSION.to_string(),
            generated_at,
            source_repository: repo,
            source_branch: branch,
            record_count: records.len(),
            records,
        };
        (manifest, tally)
    }
}

impl Extend<ShardOutcome> for CensusAggregator {
    fn extend<T: IntoIterator<Item = ShardOutcome>>(&mut self, iter: T) {
        for outcome in iter {
            self.absorb(outcome);
        }
    }
}
