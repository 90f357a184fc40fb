use crate::config::SHARD_EXTENSION;
use crate::error::{CensusError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursive shard discovery under a vault root.
pub struct ShardScanner {
    root: PathBuf,
    extension: String,
}

impl ShardScanner {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            extension: SHARD_EXTENSION.to_string(),
        }
    }

    #[must_use]
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// All shard files, ordered by their relative path.
    ///
    /// A missing root is a configuration fault; unreadable entries below it
    /// are logged and skipped.
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(CensusError::ConfigurationFault(self.root.clone()));
        }

        let mut shards = Vec::new();
        for entry in WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    log::warn!("Skipping unreadable vault entry: {err}");
                    continue;
                }
            };
            // Links are not walked into, but a link to a file is still a shard.
            let is_file = entry.file_type().is_file()
                || (entry.path_is_symlink() && entry.path().is_file());
            if is_file && self.is_shard(entry.path()) {
                shards.push(entry.into_path());
            }
        }

        // Directory-first walk order differs from plain path order; settle on one.
        shards.sort_by_cached_key(|path| relative_key(&self.root, path));
        log::debug!("Found {} shards under {}", shards.len(), self.root.display());
        Ok(shards)
    }

    fn is_shard(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == self.extension)
    }
}

/// Forward-slash path of `path` relative to `root`.
pub(crate) fn relative_key(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
