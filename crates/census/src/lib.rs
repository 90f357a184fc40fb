//! # Grimoire Census
//!
//! Builds the published index of a template vault.
//!
//! ## Pipeline
//!
//! ```text
//! Vault directory
//!     │
//!     ├──> Shard Scanner (extension marker, sorted)
//!     │      └─> Shard paths
//!     │
//!     ├──> Shard Processor (read, divine metadata, fingerprint)
//!     │      └─> Record or fault per shard
//!     │
//!     ├──> Census Aggregator (sort, tally categories)
//!     │      └─> Manifest
//!     │
//!     └──> Atomic Persister (tmp file + rename)
//!            └─> index.json
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use grimoire_census::{Census, CensusConfig, PlaceholderOracle};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = CensusConfig::for_repo("novalym/velm-grimoire");
//!     let report = Census::new(config, Box::new(PlaceholderOracle))?.run()?;
//!
//!     println!("Indexed {} of {} shards", report.record_count, report.files_scanned);
//!     Ok(())
//! }
//! ```

mod aggregator;
mod census;
mod config;
mod error;
mod fingerprint;
mod oracle;
mod persister;
mod processor;
mod report;
mod scanner;

pub use aggregator::{CensusAggregator, CensusTally, Manifest, MANIFEST_FORMAT_VERSION};
pub use census::Census;
pub use config::{CensusConfig, DEFAULT_BRANCH, DEFAULT_OUTPUT, DEFAULT_VAULT, SHARD_EXTENSION};
pub use error::{CensusError, Result, ShardFault, ShardFaultKind};
pub use fingerprint::Fingerprint;
pub use oracle::{
    CommandOracle, MetadataOracle, PlaceholderOracle, ShardMetadata, PLACEHOLDER_DESCRIPTION,
    UNCLASSIFIED,
};
pub use persister::AtomicPersister;
pub use processor::{ShardOutcome, ShardProcessor, ShardRecord};
pub use report::{CensusReport, CensusStatus};
pub use scanner::ShardScanner;
