use crate::error::ShardFault;
use crate::fingerprint::Fingerprint;
use crate::oracle::{MetadataOracle, ShardMetadata, UNCLASSIFIED};
use crate::scanner::relative_key;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Keys the census writes itself; oracle fields with these names are dropped.
const RESERVED_KEYS: [&str; 8] = [
    "name",
    "description",
    "tags",
    "category",
    "path",
    "sha256",
    "bytes",
    "url",
];

/// One indexed shard, as published in the manifest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShardRecord {
    pub name: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub category: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
    /// Stem of the file name; the oracle input.
    #[serde(skip)]
    pub identifier: String,
    #[serde(rename = "path")]
    pub relative_path: String,
    #[serde(rename = "sha256")]
    pub content_hash: String,
    #[serde(rename = "bytes")]
    pub byte_length: u64,
    #[serde(rename = "url")]
    pub source_url: String,
}

impl ShardRecord {
    /// Absent or empty descriptions make the record incomplete.
    #[must_use]
    pub fn has_description(&self) -> bool {
        self.description.as_deref().is_some_and(|d| !d.is_empty())
    }
}

/// Exactly one outcome per scanned file.
#[derive(Debug, Clone, PartialEq)]
pub enum ShardOutcome {
    Complete(ShardRecord),
    /// Record emitted, but its description is missing.
    Incomplete {
        record: ShardRecord,
        fault: ShardFault,
    },
    /// No record; the reason is captured in the fault.
    Failed(ShardFault),
}

impl ShardOutcome {
    #[must_use]
    pub fn record(&self) -> Option<&ShardRecord> {
        match self {
            Self::Complete(record) | Self::Incomplete { record, .. } => Some(record),
            Self::Failed(_) => None,
        }
    }

    #[must_use]
    pub fn fault(&self) -> Option<&ShardFault> {
        match self {
            Self::Complete(_) => None,
            Self::Incomplete { fault, .. } | Self::Failed(fault) => Some(fault),
        }
    }
}

/// Turns shard paths into records.
pub struct ShardProcessor<'a> {
    root: PathBuf,
    base_url: String,
    oracle: &'a dyn MetadataOracle,
}

impl<'a> ShardProcessor<'a> {
    pub fn new(
        root: impl AsRef<Path>,
        base_url: impl Into<String>,
        oracle: &'a dyn MetadataOracle,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            root: root.as_ref().to_path_buf(),
            base_url: base_url.trim_end_matches('/').to_string(),
            oracle,
        }
    }

    pub fn process(&self, path: &Path) -> ShardOutcome {
        let relative_path = relative_key(&self.root, path);
        match self.build_record(path, &relative_path) {
            Ok(record) if record.has_description() => ShardOutcome::Complete(record),
            Ok(record) => ShardOutcome::Incomplete {
                record,
                fault: ShardFault::incomplete(relative_path),
            },
            Err(err) => {
                ShardOutcome::Failed(ShardFault::processing(relative_path, format!("{err:#}")))
            }
        }
    }

    fn build_record(&self, path: &Path, relative_path: &str) -> anyhow::Result<ShardRecord> {
        let content = std::fs::read_to_string(path)?;
        let identifier = shard_identifier(path);
        let metadata = self.oracle.divine(&identifier, &content)?;
        // Hash the very bytes that are reported as length.
        let fingerprint = Fingerprint::of(content.as_bytes());
        Ok(self.assemble(identifier, relative_path, metadata, fingerprint))
    }

    fn assemble(
        &self,
        identifier: String,
        relative_path: &str,
        metadata: ShardMetadata,
        fingerprint: Fingerprint,
    ) -> ShardRecord {
        let ShardMetadata {
            name,
            description,
            tags,
            category,
            mut extra,
        } = metadata;
        extra.retain(|key, _| !RESERVED_KEYS.contains(&key.as_str()));

        ShardRecord {
            name: non_empty(name).unwrap_or_else(|| identifier.clone()),
            description,
            tags,
            category: non_empty(category).unwrap_or_else(|| UNCLASSIFIED.to_string()),
            extra,
            identifier,
            source_url: format!("{}/{relative_path}", self.base_url),
            relative_path: relative_path.to_string(),
            content_hash: fingerprint.sha256,
            byte_length: fingerprint.bytes,
        }
    }
}

fn shard_identifier(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShardFaultKind;
    use crate::oracle::PlaceholderOracle;
    use pretty_assertions::assert_eq;
    use std::fs;

    const BASE: &str = "https://raw.githubusercontent.com/acme/shards/main/archetypes";

    fn described(description: &str, category: Option<&str>) -> ShardMetadata {
        ShardMetadata {
            description: Some(description.to_string()),
            category: category.map(str::to_string),
            ..ShardMetadata::default()
        }
    }

    #[test]
    fn complete_record_carries_fingerprint_and_url() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("web")).unwrap();
        let path = tmp.path().join("web/api.scaffold");
        fs::write(&path, "name: api\n").unwrap();

        let oracle = |_: &str, _: &str| -> anyhow::Result<ShardMetadata> {
            Ok(described("REST API", Some("Backend")))
        };
        let outcome = ShardProcessor::new(tmp.path(), BASE, &oracle).process(&path);

        let ShardOutcome::Complete(record) = outcome else {
            panic!("expected complete outcome, got {outcome:?}");
        };
        assert_eq!(record.identifier, "api");
        assert_eq!(record.name, "api");
        assert_eq!(record.relative_path, "web/api.scaffold");
        assert_eq!(record.category, "Backend");
        assert_eq!(record.source_url, format!("{BASE}/web/api.scaffold"));
        assert_eq!(record.byte_length, 10);
        assert_eq!(record.content_hash, Fingerprint::of(b"name: api\n").sha256);
    }

    #[test]
    fn empty_description_still_emits_record() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("b.scaffold");
        fs::write(&path, "Y").unwrap();

        let oracle =
            |_: &str, _: &str| -> anyhow::Result<ShardMetadata> { Ok(described("", Some("C2"))) };
        let outcome = ShardProcessor::new(tmp.path(), BASE, &oracle).process(&path);

        let record = outcome.record().expect("record emitted");
        assert_eq!(record.description.as_deref(), Some(""));
        assert_eq!(record.category, "C2");
        assert_eq!(outcome.fault(), Some(&ShardFault::incomplete("b.scaffold")));
    }

    #[test]
    fn whitespace_description_is_kept_and_complete() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a.scaffold");
        fs::write(&path, "X").unwrap();

        let oracle =
            |_: &str, _: &str| -> anyhow::Result<ShardMetadata> { Ok(described(" ", None)) };
        let outcome = ShardProcessor::new(tmp.path(), BASE, &oracle).process(&path);

        let ShardOutcome::Complete(record) = outcome else {
            panic!("expected complete outcome, got {outcome:?}");
        };
        assert_eq!(record.description.as_deref(), Some(" "));
    }

    #[test]
    fn absent_description_is_incomplete() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("c.scaffold");
        fs::write(&path, "Z").unwrap();

        let oracle = |_: &str, _: &str| -> anyhow::Result<ShardMetadata> {
            Ok(ShardMetadata::default())
        };
        let outcome = ShardProcessor::new(tmp.path(), BASE, &oracle).process(&path);

        assert_eq!(outcome.record().map(|r| r.description.clone()), Some(None));
        assert_eq!(outcome.fault(), Some(&ShardFault::incomplete("c.scaffold")));
    }

    #[test]
    fn oracle_error_is_processing_fault() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("broken.scaffold");
        fs::write(&path, "???").unwrap();

        let oracle = |id: &str, _: &str| -> anyhow::Result<ShardMetadata> {
            anyhow::bail!("cannot classify {id}")
        };
        let outcome = ShardProcessor::new(tmp.path(), BASE, &oracle).process(&path);

        assert!(outcome.record().is_none());
        assert_eq!(
            outcome.fault().map(|f| &f.kind),
            Some(&ShardFaultKind::Processing {
                reason: "cannot classify broken".to_string()
            })
        );
    }

    #[test]
    fn unreadable_content_is_processing_fault() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("binary.scaffold");
        fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        let outcome = ShardProcessor::new(tmp.path(), BASE, &PlaceholderOracle).process(&path);
        let fault = outcome.fault().expect("fault");
        assert!(fault.blocks_record());
        assert_eq!(fault.relative_path, "binary.scaffold");
    }

    #[test]
    fn missing_category_and_name_fall_back() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("plain.scaffold");
        fs::write(&path, "x").unwrap();

        let oracle = |_: &str, _: &str| -> anyhow::Result<ShardMetadata> {
            let mut meta = described("plain", Some("  "));
            meta.name = Some(String::new());
            meta.extra.insert("sha256".into(), "forged".into());
            meta.extra.insert("tier".into(), "gold".into());
            Ok(meta)
        };
        let outcome = ShardProcessor::new(tmp.path(), format!("{BASE}/"), &oracle).process(&path);
        let record = outcome.record().expect("record");

        assert_eq!(record.name, "plain");
        assert_eq!(record.category, UNCLASSIFIED);
        assert_eq!(record.source_url, format!("{BASE}/plain.scaffold"));
        assert_eq!(record.extra.len(), 1);
        assert!(record.extra.contains_key("tier"));
        assert_ne!(record.content_hash, "forged");
    }
}
