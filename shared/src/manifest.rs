//! The runtime matrix shared by the deployer and the invoker.
//!
//! The manifest is owned by the benchmark project and read verbatim, so field
//! names follow its camelCase JSON keys.

use crate::error::{Error, Result};
use crate::s3::get_from_json;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub runtimes: Vec<RuntimeEntry>,
    pub memory_sizes: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeEntry {
    pub runtime: String,
    pub handler: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub architectures: Vec<String>,
    /// Create-function fragment for SnapStart runtimes, kept as written,
    /// e.g. `{"SnapStart": {"ApplyOn": "PublishedVersions"}}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snap_start: Option<Value>,
    /// Keys this crate does not interpret, such as `displayName`. They are
    /// forwarded untouched in every invocation context.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Where a run reads its manifest from.
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestSource {
    File(PathBuf),
    S3 { bucket: String, key: String },
}

impl ManifestSource {
    /// `MANIFEST_BUCKET` and `MANIFEST_KEY` select S3, otherwise the file at
    /// `MANIFEST_PATH` (default `manifest.json`) bundled with the function.
    pub fn from_env() -> Self {
        match (
            std::env::var("MANIFEST_BUCKET").ok(),
            std::env::var("MANIFEST_KEY").ok(),
        ) {
            (Some(bucket), Some(key)) => ManifestSource::S3 { bucket, key },
            _ => ManifestSource::File(
                std::env::var("MANIFEST_PATH")
                    .unwrap_or_else(|_| "manifest.json".to_string())
                    .into(),
            ),
        }
    }
}

impl Manifest {
    pub async fn load(source: &ManifestSource, s3: &aws_sdk_s3::Client) -> Result<Self> {
        let manifest = match source {
            ManifestSource::File(path) => Self::from_file(path)?,
            ManifestSource::S3 { bucket, key } => get_from_json(s3, bucket, key).await?,
        };
        info!(
            "Manifest loaded: {} runtimes, {} memory sizes",
            manifest.runtimes.len(),
            manifest.memory_sizes.len()
        );

        Ok(manifest)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let manifest = fs::read_to_string(path)?;
        let manifest: Manifest = serde_json::from_str(&manifest)?;

        Ok(manifest)
    }

    /// Fails when two runtimes sharing an architecture would be deployed
    /// under the same function name, or when a SnapStart fragment cannot be
    /// applied. An empty matrix is valid and deploys nothing.
    pub fn validate(&self, project: &str, memory_size: u16) -> Result<()> {
        let mut seen: HashMap<String, &RuntimeEntry> = HashMap::new();
        for entry in &self.runtimes {
            entry.snap_start_apply_on()?;
            for architecture in &entry.architectures {
                let name = entry.function_name(project, memory_size, architecture);
                if let Some(previous) = seen.insert(name.clone(), entry) {
                    return Err(Error::NameCollision {
                        name,
                        first: previous.runtime.clone(),
                        second: entry.runtime.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

impl RuntimeEntry {
    /// `path` when set, otherwise the runtime with its first dot removed.
    pub fn suffix(&self) -> String {
        match &self.path {
            Some(path) => path.clone(),
            None => self.runtime.replacen('.', "", 1),
        }
    }

    pub fn function_name(&self, project: &str, memory_size: u16, architecture: &str) -> String {
        format!(
            "{}-{}-{}-{}",
            project,
            self.suffix(),
            memory_size,
            architecture
        )
    }

    pub fn code_key(&self, architecture: &str) -> String {
        format!("{}/code_{}.zip", self.suffix(), architecture)
    }

    pub fn supports(&self, architecture: &str) -> bool {
        self.architectures.iter().any(|a| a == architecture)
    }

    /// `ApplyOn` of the SnapStart fragment, `None` for plain runtimes.
    pub fn snap_start_apply_on(&self) -> Result<Option<String>> {
        let Some(fragment) = &self.snap_start else {
            return Ok(None);
        };
        fragment
            .get("SnapStart")
            .and_then(|snap_start| snap_start.get("ApplyOn"))
            .and_then(Value::as_str)
            .map(|apply_on| Some(apply_on.to_string()))
            .ok_or_else(|| {
                Error::Manifest(format!(
                    "snapStart of {} must look like {{\"SnapStart\": {{\"ApplyOn\": \"...\"}}}}, got {}",
                    self.runtime, fragment
                ))
            })
    }
}

pub fn log_group_name(function_name: &str) -> String {
    format!("/aws/lambda/{}", function_name)
}

pub fn code_bucket(project: &str, region: &str) -> String {
    format!("{}-{}", project, region)
}
