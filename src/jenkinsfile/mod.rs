//! Discovery and parsing of Jenkins pipeline files.

pub mod stages;

use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::project::{ProjectType, classify};

pub use stages::{Stage, StageCategory, classify_stage, extract_stages};

/// File names recognised as pipeline definitions.
pub const PIPELINE_FILE_NAMES: &[&str] = &["Jenkinsfile", "jenkinsfile", "Jenkinsfile.groovy"];

/// Everything the workflow builder needs to know about one pipeline file.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineInfo {
    pub stages: Vec<Stage>,
    pub project_type: ProjectType,
    /// Project directory relative to the conversion root, `/`-separated.
    /// `None` when the pipeline file sits at the root.
    pub working_directory: Option<String>,
}

impl PipelineInfo {
    pub fn has_stage(&self, category: StageCategory) -> bool {
        self.stages.iter().any(|stage| stage.category == category)
    }
}

/// Walk `root` and return every pipeline file in file-name order.
///
/// Directories starting with `.git` are never entered, and neither is `skip`
/// (used to keep the conversion output out of its own input).
pub fn discover(root: &Path, skip: Option<&Path>) -> Vec<PathBuf> {
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            let hidden_vcs = entry.file_name().to_string_lossy().starts_with(".git");
            !hidden_vcs && skip != Some(entry.path())
        });

    let mut found = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Skipping unreadable entry during discovery: {err}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if PIPELINE_FILE_NAMES.contains(&name.as_ref()) {
            debug!(file = %entry.path().display(), "Found pipeline file");
            found.push(entry.into_path());
        }
    }
    found
}

/// Read and parse the pipeline file at `path`, which must live under `root`.
pub fn parse_pipeline(root: &Path, path: &Path) -> Result<PipelineInfo> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read pipeline file: {}", path.display()))?;
    let project_dir = path.parent().unwrap_or(root);

    Ok(PipelineInfo {
        stages: extract_stages(&content),
        project_type: classify(project_dir),
        working_directory: working_directory(root, project_dir),
    })
}

/// Path of `dir` relative to `root` with forward slashes, `None` for the root itself.
pub fn working_directory(root: &Path, dir: &Path) -> Option<String> {
    let relative = dir.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Output document name: `ci` at the root, `ci-<directory>` elsewhere.
pub fn workflow_name(root: &Path, path: &Path) -> String {
    let parent = path.parent().unwrap_or(root);
    match parent.strip_prefix(root).ok().and_then(Path::file_name) {
        Some(dir) => format!(
            "ci-{}",
            dir.to_string_lossy().to_lowercase().replace(' ', "-")
        ),
        None => "ci".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn working_directory_is_none_at_root() {
        let root = Path::new("/repo");
        assert_eq!(working_directory(root, root), None);
    }

    #[test]
    fn working_directory_uses_forward_slashes() {
        let root = Path::new("/repo");
        let dir = root.join("proj").join("sub");
        assert_eq!(working_directory(root, &dir).as_deref(), Some("proj/sub"));
    }

    #[test]
    fn workflow_name_follows_containing_directory() {
        let root = Path::new("/repo");
        assert_eq!(workflow_name(root, &root.join("Jenkinsfile")), "ci");
        assert_eq!(
            workflow_name(root, &root.join("proj/sub/Jenkinsfile")),
            "ci-sub"
        );
        assert_eq!(
            workflow_name(root, &root.join("My Service/Jenkinsfile")),
            "ci-my-service"
        );
    }

    #[test]
    fn discovery_skips_git_directories() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join(".git/hooks")).unwrap();
        fs::create_dir_all(root.join("app")).unwrap();
        fs::write(root.join(".git/hooks/Jenkinsfile"), "").unwrap();
        fs::write(root.join("app/jenkinsfile"), "").unwrap();
        fs::write(root.join("Jenkinsfile.groovy"), "").unwrap();
        fs::write(root.join("Jenkinsfile.bak"), "").unwrap();

        let found = discover(root, None);
        assert_eq!(
            found,
            vec![root.join("Jenkinsfile.groovy"), root.join("app/jenkinsfile")]
        );
    }

    #[test]
    fn discovery_skips_requested_directory() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        let out = root.join("out");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("Jenkinsfile"), "").unwrap();
        fs::write(root.join("Jenkinsfile"), "").unwrap();

        let found = discover(root, Some(&out));
        assert_eq!(found, vec![root.join("Jenkinsfile")]);
    }

    #[test]
    fn parse_pipeline_collects_project_context() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        let project = root.join("services").join("api");
        fs::create_dir_all(&project).unwrap();
        fs::write(project.join("pom.xml"), "<project/>").unwrap();
        fs::write(
            project.join("Jenkinsfile"),
            "stage('Build') {}\nstage('Deploy') {}",
        )
        .unwrap();

        let info = parse_pipeline(root, &project.join("Jenkinsfile")).unwrap();
        assert_eq!(info.project_type, ProjectType::Maven);
        assert_eq!(info.working_directory.as_deref(), Some("services/api"));
        assert!(info.has_stage(StageCategory::Deliver));
        assert!(!info.has_stage(StageCategory::Security));
    }
}
