//! Per-run diagnostics.
//!
//! A [`ConversionReport`] is threaded through the converter and the tree
//! mirror. Everything that went wrong or was skipped ends up here as well as
//! in the log, so callers can inspect the outcome without scraping output.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{error, info, warn};

use crate::jenkinsfile::{PipelineInfo, StageCategory};
use crate::project::ProjectType;

#[derive(Debug, Serialize)]
pub struct ConversionReport {
    pub generated_at: DateTime<Utc>,
    pub input: PathBuf,
    pub output: PathBuf,
    pub workflows: Vec<ConvertedWorkflow>,
    pub skipped: Vec<SkippedPipeline>,
    pub failures: Vec<FileFailure>,
    pub warnings: Vec<String>,
    pub mirror: MirrorSummary,
}

#[derive(Debug, Serialize)]
pub struct ConvertedWorkflow {
    pub source: PathBuf,
    pub workflow: PathBuf,
    pub project_type: ProjectType,
    pub working_directory: Option<String>,
    pub stages: Vec<StageSummary>,
    pub jobs: Vec<String>,
    pub sha256: String,
}

#[derive(Debug, Serialize)]
pub struct StageSummary {
    pub name: String,
    pub category: StageCategory,
}

#[derive(Debug, Serialize)]
pub struct SkippedPipeline {
    pub source: PathBuf,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Default, Serialize)]
pub struct MirrorSummary {
    pub directories: usize,
    pub copied: usize,
    pub existing: usize,
    pub excluded: usize,
    pub failures: Vec<FileFailure>,
}

impl ConversionReport {
    pub fn new(input: &Path, output: &Path) -> Self {
        Self {
            generated_at: Utc::now(),
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            workflows: Vec::new(),
            skipped: Vec::new(),
            failures: Vec::new(),
            warnings: Vec::new(),
            mirror: MirrorSummary::default(),
        }
    }

    pub fn converted(
        &mut self,
        source: &Path,
        workflow: &Path,
        info: &PipelineInfo,
        jobs: Vec<String>,
        rendered: &str,
    ) {
        info!(
            source = %source.display(),
            workflow = %workflow.display(),
            stages = info.stages.len(),
            "Generated workflow"
        );
        self.workflows.push(ConvertedWorkflow {
            source: source.to_path_buf(),
            workflow: workflow.to_path_buf(),
            project_type: info.project_type,
            working_directory: info.working_directory.clone(),
            stages: info
                .stages
                .iter()
                .map(|stage| StageSummary {
                    name: stage.name.clone(),
                    category: stage.category,
                })
                .collect(),
            jobs,
            sha256: sha256_hex(rendered.as_bytes()),
        });
    }

    pub fn skipped(&mut self, source: &Path, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(file = %source.display(), "Skipping pipeline: {reason}");
        self.skipped.push(SkippedPipeline {
            source: source.to_path_buf(),
            reason,
        });
    }

    pub fn failed(&mut self, source: &Path, err: &anyhow::Error) {
        error!(file = %source.display(), "Error converting pipeline: {err:#}");
        self.failures.push(FileFailure {
            path: source.to_path_buf(),
            error: format!("{err:#}"),
        });
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{message}");
        self.warnings.push(message);
    }

    pub fn copy_failed(&mut self, path: &Path, err: &anyhow::Error) {
        error!(file = %path.display(), "Failed to copy: {err:#}");
        self.mirror.failures.push(FileFailure {
            path: path.to_path_buf(),
            error: format!("{err:#}"),
        });
    }

    /// True when nothing was skipped and nothing failed.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.failures.is_empty() && self.mirror.failures.is_empty()
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create report directory: {}", parent.display())
            })?;
        }
        let file = File::create(path)
            .with_context(|| format!("Failed to create report file: {}", path.display()))?;
        serde_json::to_writer_pretty(file, self)
            .with_context(|| format!("Failed to write report JSON: {}", path.display()))?;
        Ok(())
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
