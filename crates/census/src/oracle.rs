use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Write;
use std::process::{Command, Stdio};

/// Category assigned when the oracle supplies none.
pub const UNCLASSIFIED: &str = "Unclassified";
pub const PLACEHOLDER_DESCRIPTION: &str = "Metadata deferred";

/// Descriptive fields derived for one shard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShardMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Any further fields the oracle chose to supply.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// External classifier: identifier + content -> descriptive fields.
///
/// An `Err` is recorded as a processing fault for that shard only.
pub trait MetadataOracle {
    fn divine(&self, identifier: &str, content: &str) -> anyhow::Result<ShardMetadata>;
}

impl<F> MetadataOracle for F
where
    F: Fn(&str, &str) -> anyhow::Result<ShardMetadata>,
{
    fn divine(&self, identifier: &str, content: &str) -> anyhow::Result<ShardMetadata> {
        self(identifier, content)
    }
}

/// Used when no classifier is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderOracle;

impl MetadataOracle for PlaceholderOracle {
    fn divine(&self, identifier: &str, _content: &str) -> anyhow::Result<ShardMetadata> {
        Ok(ShardMetadata {
            name: Some(identifier.to_string()),
            description: Some(PLACEHOLDER_DESCRIPTION.to_string()),
            tags: Vec::new(),
            category: Some(UNCLASSIFIED.to_string()),
            extra: serde_json::Map::new(),
        })
    }
}

/// Runs an external classifier once per shard.
///
/// The identifier is appended as the last argument, the content is written to
/// stdin and stdout must hold one JSON object.
#[derive(Debug, Clone)]
pub struct CommandOracle {
    program: String,
    args: Vec<String>,
}

impl CommandOracle {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Builds from `[program, args...]`; `None` when the list is empty.
    #[must_use]
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }
}

impl MetadataOracle for CommandOracle {
    fn divine(&self, identifier: &str, content: &str) -> anyhow::Result<ShardMetadata> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(identifier)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to spawn oracle {}", self.program))?;

        let mut stdin = child.stdin.take().context("oracle stdin unavailable")?;
        let output = std::thread::scope(|scope| -> anyhow::Result<std::process::Output> {
            let writer = scope.spawn(move || stdin.write_all(content.as_bytes()));
            let output = child.wait_with_output();
            let written = writer
                .join()
                .map_err(|_| anyhow::anyhow!("oracle stdin writer panicked"))?;
            // A classifier may exit without draining stdin; its exit status decides.
            if let Err(err) = written {
                if err.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(anyhow::Error::new(err).context("failed to feed oracle"));
                }
            }
            output.context("failed to wait for oracle")
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "oracle {} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            );
        }

        serde_json::from_slice(&output.stdout)
            .with_context(|| format!("oracle {} returned invalid metadata", self.program))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn placeholder_names_shard_after_identifier() {
        let meta = PlaceholderOracle.divine("fastapi-service", "body").unwrap();
        assert_eq!(meta.name.as_deref(), Some("fastapi-service"));
        assert_eq!(meta.category.as_deref(), Some(UNCLASSIFIED));
        assert_eq!(meta.description.as_deref(), Some(PLACEHOLDER_DESCRIPTION));
        assert!(meta.tags.is_empty());
    }

    #[test]
    fn metadata_keeps_unknown_fields() {
        let meta: ShardMetadata = serde_json::from_str(
            r#"{"name":"api","description":"REST API","tags":["web"],"category":"Backend","tier":"gold"}"#,
        )
        .unwrap();
        assert_eq!(meta.tags, vec!["web".to_string()]);
        assert_eq!(meta.extra.get("tier"), Some(&Value::from("gold")));
    }

    #[test]
    fn closures_are_oracles() {
        let oracle = |id: &str, content: &str| -> anyhow::Result<ShardMetadata> {
            Ok(ShardMetadata {
                name: Some(id.to_uppercase()),
                description: Some(format!("{} bytes", content.len())),
                ..ShardMetadata::default()
            })
        };
        let meta = oracle.divine("cli", "abcd").unwrap();
        assert_eq!(meta.name.as_deref(), Some("CLI"));
        assert_eq!(meta.description.as_deref(), Some("4 bytes"));
    }

    #[test]
    fn empty_argv_has_no_command_oracle() {
        assert!(CommandOracle::from_argv(&[]).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn command_oracle_parses_stdout() {
        let script = r#"printf '{"name":"%s","description":"from sh","category":"Shell"}' "$1""#;
        let oracle = CommandOracle::new(
            "sh",
            vec!["-c".to_string(), script.to_string(), "oracle".to_string()],
        );
        let meta = oracle.divine("deploy", "echo hi\n").unwrap();
        assert_eq!(meta.name.as_deref(), Some("deploy"));
        assert_eq!(meta.description.as_deref(), Some("from sh"));
        assert_eq!(meta.category.as_deref(), Some("Shell"));
    }

    #[cfg(unix)]
    #[test]
    fn command_oracle_failure_is_an_error() {
        let oracle = CommandOracle::new(
            "sh",
            vec![
                "-c".to_string(),
                "echo boom >&2; exit 3".to_string(),
                "oracle".to_string(),
            ],
        );
        let err = oracle.divine("deploy", "").unwrap_err();
        assert!(err.to_string().contains("boom"), "{err}");
    }
}
