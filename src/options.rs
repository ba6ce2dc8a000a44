use std::path::Path;

use anyhow::{Context, Result};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

pub const DEFAULT_JAVA_VERSIONS: &[&str] = &["17", "21"];
pub const DEFAULT_RUNNER: &str = "ubuntu-latest";

/// Settings that shape the generated workflows.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConvertOptions {
    /// Matrix axis for the build job. The last entry is the "primary" version
    /// used for artifact upload, delivery and scanning.
    #[serde(
        rename = "java-versions",
        default = "default_versions",
        deserialize_with = "versions_from_yaml"
    )]
    pub versions: Vec<String>,
    #[serde(default = "default_runner")]
    pub runner: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            versions: default_versions(),
            runner: default_runner(),
        }
    }
}

fn default_versions() -> Vec<String> {
    DEFAULT_JAVA_VERSIONS.iter().map(|v| v.to_string()).collect()
}

// Accept `[17, 21]` as well as `["17", "21"]`.
fn versions_from_yaml<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<serde_yaml::Value>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|value| match value {
            serde_yaml::Value::String(text) => Ok(text),
            serde_yaml::Value::Number(number) => Ok(number.to_string()),
            other => Err(de::Error::custom(format!(
                "unsupported Java version entry: {other:?}"
            ))),
        })
        .collect()
}

fn default_runner() -> String {
    DEFAULT_RUNNER.to_string()
}

impl ConvertOptions {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read options file: {}", path.display()))?;
        let options: ConvertOptions = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse options YAML: {}", path.display()))?;
        Ok(options)
    }

    /// Version that runs the single-shot jobs.
    pub fn primary_version(&self) -> Option<&str> {
        self.versions.last().map(String::as_str)
    }
}
