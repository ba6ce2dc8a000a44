//! Workflow model builder.

pub mod maven;

use crate::document::{Mapping, Value};
use crate::error::ConvertError;
use crate::jenkinsfile::PipelineInfo;
use crate::options::ConvertOptions;
use crate::project::ProjectType;

pub use maven::{BUILD_JOB, DELIVER_JOB, MavenJobs, SECURITY_JOB};

pub const WORKFLOW_TITLE: &str = "CI/CD Pipeline";
const PUSH_BRANCHES: &[&str] = &["main", "develop"];
const PULL_REQUEST_BRANCHES: &[&str] = &["main"];

/// Build the workflow document for one parsed pipeline.
///
/// Only Maven projects are modelled; any other project type is rejected with
/// [`ConvertError::UnsupportedProject`] so the caller can skip the file.
pub fn build_workflow(
    info: &PipelineInfo,
    options: &ConvertOptions,
) -> Result<Mapping, ConvertError> {
    let primary = options
        .primary_version()
        .ok_or_else(|| ConvertError::InvalidOptions {
            errors: vec!["At least one Java version is required".into()],
        })?;

    let jobs = match info.project_type {
        ProjectType::Maven => MavenJobs {
            runner: &options.runner,
            versions: &options.versions,
            primary,
        }
        .build(info),
        other => return Err(ConvertError::UnsupportedProject(other)),
    };

    let mut document = Mapping::new();
    document.insert("name".into(), WORKFLOW_TITLE.into());
    document.insert("on".into(), triggers());
    document.insert("jobs".into(), Value::Mapping(jobs));
    Ok(document)
}

fn triggers() -> Value {
    Value::mapping()
        .with(
            "push",
            Value::mapping().with("branches", PUSH_BRANCHES.to_vec()),
        )
        .with(
            "pull_request",
            Value::mapping().with("branches", PULL_REQUEST_BRANCHES.to_vec()),
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jenkinsfile::{Stage, StageCategory};

    fn pipeline(project_type: ProjectType) -> PipelineInfo {
        PipelineInfo {
            stages: vec![Stage {
                name: "Deliver".into(),
                category: StageCategory::Deliver,
                commands: Vec::new(),
            }],
            project_type,
            working_directory: None,
        }
    }

    #[test]
    fn maven_workflow_has_header_and_jobs() {
        let document = build_workflow(&pipeline(ProjectType::Maven), &ConvertOptions::default())
            .unwrap();
        let keys: Vec<_> = document.keys().map(String::as_str).collect();
        assert_eq!(keys, ["name", "on", "jobs"]);
        assert_eq!(document["name"].as_str(), Some(WORKFLOW_TITLE));
        let jobs = document["jobs"].as_mapping().unwrap();
        assert!(jobs.contains_key(BUILD_JOB));
        assert!(jobs.contains_key(DELIVER_JOB));
        assert!(jobs.contains_key(SECURITY_JOB));
    }

    #[test]
    fn non_maven_projects_are_rejected() {
        for project_type in [ProjectType::Gradle, ProjectType::Node, ProjectType::Generic] {
            let err = build_workflow(&pipeline(project_type), &ConvertOptions::default())
                .unwrap_err();
            assert!(matches!(err, ConvertError::UnsupportedProject(t) if t == project_type));
        }
    }

    #[test]
    fn empty_version_list_is_an_options_error() {
        let options = ConvertOptions {
            versions: Vec::new(),
            ..ConvertOptions::default()
        };
        let err = build_workflow(&pipeline(ProjectType::Maven), &options).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidOptions { .. }));
    }
}
