use crate::error::{CensusError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_VAULT: &str = "archetypes";
pub const DEFAULT_OUTPUT: &str = "index.json";
/// Extension marker of shard files, without the leading dot.
pub const SHARD_EXTENSION: &str = "scaffold";

const RAW_CONTENT_HOST: &str = "https://raw.githubusercontent.com";

/// Already-parsed census parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CensusConfig {
    /// Repository identifier, e.g. `novalym/velm-grimoire`.
    pub repo: String,
    pub branch: String,
    /// Vault directory, relative to the repository root.
    pub vault: String,
    pub output: PathBuf,
    pub extension: String,
    /// Overrides the derived raw-content URL prefix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// External classifier program and its leading arguments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oracle_command: Option<Vec<String>>,
}

impl Default for CensusConfig {
    fn default() -> Self {
        Self {
            repo: String::new(),
            branch: DEFAULT_BRANCH.to_string(),
            vault: DEFAULT_VAULT.to_string(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            extension: SHARD_EXTENSION.to_string(),
            base_url: None,
            oracle_command: None,
        }
    }
}

impl CensusConfig {
    pub fn for_repo(repo: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| CensusError::InvalidConfig(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.repo.trim().is_empty() {
            return Err(CensusError::InvalidConfig(
                "repository identifier is required".into(),
            ));
        }
        if self.branch.trim().is_empty() {
            return Err(CensusError::InvalidConfig("branch must not be empty".into()));
        }
        if self.extension.trim_start_matches('.').is_empty() {
            return Err(CensusError::InvalidConfig(
                "shard extension must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Directory that is scanned for shards.
    #[must_use]
    pub fn vault_path(&self) -> PathBuf {
        PathBuf::from(&self.vault)
    }

    #[must_use]
    pub fn extension(&self) -> &str {
        self.extension.trim_start_matches('.')
    }

    /// Prefix that shard relative paths are appended to.
    #[must_use]
    pub fn base_url(&self) -> String {
        if let Some(url) = &self.base_url {
            return url.trim_end_matches('/').to_string();
        }
        let mut url = format!(
            "{RAW_CONTENT_HOST}/{}/{}",
            self.repo.trim_matches('/'),
            self.branch.trim_matches('/')
        );
        let vault = normalize_vault(&self.vault);
        if !vault.is_empty() {
            url.push('/');
            url.push_str(&vault);
        }
        url
    }
}

fn normalize_vault(raw: &str) -> String {
    let mut value = raw.trim().replace('\\', "/");
    while let Some(rest) = value.strip_prefix("./") {
        value = rest.to_string();
    }
    if value == "." {
        return String::new();
    }
    value.trim_matches('/').to_string()
}
