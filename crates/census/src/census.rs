use crate::aggregator::{CensusAggregator, CensusTally, Manifest};
use crate::config::CensusConfig;
use crate::error::Result;
use crate::oracle::{CommandOracle, MetadataOracle, PlaceholderOracle};
use crate::persister::AtomicPersister;
use crate::processor::ShardProcessor;
use crate::report::CensusReport;
use crate::scanner::ShardScanner;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// One full rebuild of the vault index.
pub struct Census {
    config: CensusConfig,
    oracle: Box<dyn MetadataOracle>,
}

impl Census {
    pub fn new(config: CensusConfig, oracle: Box<dyn MetadataOracle>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, oracle })
    }

    /// Picks the oracle from `oracle_command`, falling back to the placeholder.
    pub fn from_config(config: CensusConfig) -> Result<Self> {
        let oracle: Box<dyn MetadataOracle> = match config
            .oracle_command
            .as_deref()
            .and_then(CommandOracle::from_argv)
        {
            Some(command) => Box::new(command),
            None => {
                log::info!("No metadata oracle configured; using placeholder metadata");
                Box::new(PlaceholderOracle)
            }
        };
        Self::new(config, oracle)
    }

    /// Scans, processes and aggregates without writing anything.
    pub fn survey(&self) -> Result<(Manifest, CensusTally)> {
        let vault = self.config.vault_path();
        log::info!(
            "Census of {} ({}) at {}",
            self.config.repo,
            self.config.branch,
            vault.display()
        );

        let shards = ShardScanner::new(&vault)
            .with_extension(self.config.extension())
            .scan()?;
        log::info!("Discovered {} shards", shards.len());

        let processor = ShardProcessor::new(&vault, self.config.base_url(), self.oracle.as_ref());
        let mut aggregator = CensusAggregator::new(&self.config.repo, &self.config.branch);
        for shard in &shards {
            let outcome = processor.process(shard);
            match outcome.fault() {
                Some(fault) => log::warn!("{fault}"),
                None => log::debug!("Indexed {}", shard.display()),
            }
            aggregator.absorb(outcome);
        }

        Ok(aggregator.finish(unix_now_secs()))
    }

    pub fn run(&self) -> Result<CensusReport> {
        let start = Instant::now();
        let (manifest, tally) = self.survey()?;

        AtomicPersister::new(&self.config.output).persist(&manifest)?;
        #[allow(clippy::cast_possible_truncation)]
        let duration_ms = start.elapsed().as_millis() as u64;

        let report = CensusReport {
            output_path: self.config.output.clone(),
            format_version: manifest.format_version,
            files_scanned: tally.files_seen,
            record_count: manifest.record_count,
            category_counts: tally.category_counts,
            faults: tally.faults,
            duration_ms,
        };
        log::info!(
            "Census completed: {} records, {} faults, status {}",
            report.record_count,
            report.faults.len(),
            report.status().as_str()
        );
        Ok(report)
    }
}

fn unix_now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
