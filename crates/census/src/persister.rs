use crate::aggregator::Manifest;
use crate::error::{CensusError, Result};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes manifests with tmp-file + rename so readers never see a partial file.
pub struct AtomicPersister {
    destination: PathBuf,
}

impl AtomicPersister {
    pub fn new(destination: impl AsRef<Path>) -> Self {
        Self {
            destination: destination.as_ref().to_path_buf(),
        }
    }

    /// Sibling of the destination that receives the content before the swap.
    #[must_use]
    pub fn temp_path(&self) -> PathBuf {
        let mut name = self
            .destination
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("index.json"));
        name.push(".tmp");
        self.destination.with_file_name(name)
    }

    /// Pretty-printed (2-space) JSON with a trailing newline.
    pub fn render(manifest: &Manifest) -> Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(manifest)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    pub fn persist(&self, manifest: &Manifest) -> Result<()> {
        let bytes = Self::render(manifest)?;
        self.persist_bytes(&bytes)
    }

    pub fn persist_bytes(&self, bytes: &[u8]) -> Result<()> {
        if self.destination.file_name().is_none() {
            return Err(CensusError::InvalidConfig(format!(
                "output path has no file name: {}",
                self.destination.display()
            )));
        }
        if let Some(parent) = self.destination.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| self.fault(source))?;
            }
        }

        let tmp = self.temp_path();
        if let Err(source) = write_synced(&tmp, bytes) {
            discard(&tmp);
            return Err(self.fault(source));
        }
        if let Err(source) = fs::rename(&tmp, &self.destination) {
            discard(&tmp);
            return Err(self.fault(source));
        }

        log::debug!(
            "Wrote {} bytes to {}",
            bytes.len(),
            self.destination.display()
        );
        Ok(())
    }

    fn fault(&self, source: std::io::Error) -> CensusError {
        CensusError::PersistenceFault {
            path: self.destination.clone(),
            source,
        }
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

fn discard(tmp: &Path) {
    if let Err(err) = fs::remove_file(tmp) {
        if err.kind() != std::io::ErrorKind::NotFound {
            log::warn!("Failed to remove {}: {err}", tmp.display());
        }
    }
}
