use anyhow::{Context, Result};
use clap::Parser;
use grimoire_census::CensusConfig;
use std::path::PathBuf;

/// Rebuilds the shard index of a template vault.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Repository identifier used for raw URLs (e.g. novalym/velm-grimoire)
    #[arg(long)]
    pub repo: Option<String>,

    /// Branch the raw URLs point at [default: main]
    #[arg(long)]
    pub branch: Option<String>,

    /// Vault directory containing the shards [default: archetypes]
    #[arg(long)]
    pub vault: Option<String>,

    /// Where to write the index [default: index.json]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Shard extension marker [default: scaffold]
    #[arg(long)]
    pub extension: Option<String>,

    /// Override the raw-content URL prefix
    #[arg(long)]
    pub base_url: Option<String>,

    /// External metadata classifier command; consumes the remaining words
    #[arg(long = "oracle-cmd", value_name = "WORD", num_args = 1.., allow_hyphen_values = true)]
    pub oracle_cmd: Vec<String>,

    /// TOML file with census settings; flags take precedence
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Suppress non-error messages
    #[arg(short, long, default_value_t = false, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        }
    }

    pub fn into_config(self) -> Result<CensusConfig> {
        let mut config = match &self.config {
            Some(path) => CensusConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => CensusConfig::default(),
        };

        if let Some(repo) = self.repo {
            config.repo = repo;
        }
        if let Some(branch) = self.branch {
            config.branch = branch;
        }
        if let Some(vault) = self.vault {
            config.vault = vault;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(extension) = self.extension {
            config.extension = extension;
        }
        if self.base_url.is_some() {
            config.base_url = self.base_url;
        }
        if !self.oracle_cmd.is_empty() {
            config.oracle_command = Some(self.oracle_cmd);
        }
        Ok(config)
    }
}
