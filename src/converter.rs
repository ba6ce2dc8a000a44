use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{info, instrument};

use crate::document::{Value, render};
use crate::error::ConvertError;
use crate::jenkinsfile::{discover, parse_pipeline, workflow_name};
use crate::mirror::mirror_tree;
use crate::options::ConvertOptions;
use crate::report::ConversionReport;
use crate::validation::{validate_document, validate_options};
use crate::workflow::build_workflow;

/// Directory, relative to the output root, that receives generated workflows.
pub const WORKFLOWS_DIR: &str = ".github/workflows";

/// Converts every pipeline file under `input` into a workflow under `output`
/// and mirrors the rest of the tree next to it.
#[derive(Debug, Clone)]
pub struct Converter {
    input: PathBuf,
    output: PathBuf,
    options: ConvertOptions,
    dry_run: bool,
}

impl Converter {
    pub fn new(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        options: ConvertOptions,
    ) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            options,
            dry_run: false,
        }
    }

    /// Discover and convert without touching the output directory.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn workflows_dir(&self) -> PathBuf {
        self.output.join(WORKFLOWS_DIR)
    }

    /// Run the whole conversion.
    ///
    /// Only a missing input directory, invalid options or an output
    /// directory that cannot be created are returned as errors. Everything
    /// else (unsupported projects, broken pipeline files, copy failures) is
    /// recorded in the returned report.
    #[instrument(
        skip(self),
        fields(input = %self.input.display(), output = %self.output.display())
    )]
    pub fn convert(&self) -> Result<ConversionReport, ConvertError> {
        if !self.input.is_dir() {
            return Err(ConvertError::InputMissing(self.input.clone()));
        }

        let validation = validate_options(&self.options);
        if !validation.is_ok() {
            return Err(ConvertError::InvalidOptions {
                errors: validation.errors,
            });
        }

        let mut report = ConversionReport::new(&self.input, &self.output);
        for warning in &validation.warnings {
            report.warn(warning);
        }

        let input = self.input.canonicalize()?;
        if !self.dry_run {
            fs::create_dir_all(self.workflows_dir())?;
        }
        let output = self.output.canonicalize().ok();

        let pipelines = discover(&input, output.as_deref());
        if pipelines.is_empty() {
            report.warn(format!("No Jenkinsfiles found in {}", self.input.display()));
            return Ok(report);
        }
        info!(count = pipelines.len(), "Found pipeline file(s)");

        let names = assign_names(&input, &pipelines, &mut report);
        for (source, name) in pipelines.iter().zip(&names) {
            if let Err(err) = self.convert_pipeline(&input, source, name, &mut report) {
                report.failed(source, &err);
            }
        }

        if let Some(output) = output.as_deref()
            && !self.dry_run
        {
            mirror_tree(&input, output, &mut report);
        }

        info!(
            converted = report.workflows.len(),
            skipped = report.skipped.len(),
            failed = report.failures.len(),
            "Conversion finished"
        );
        Ok(report)
    }

    fn convert_pipeline(
        &self,
        root: &Path,
        source: &Path,
        name: &str,
        report: &mut ConversionReport,
    ) -> anyhow::Result<()> {
        info!(file = %source.display(), "Converting pipeline");
        let info = parse_pipeline(root, source)?;

        let document = match build_workflow(&info, &self.options) {
            Ok(document) => document,
            Err(ConvertError::UnsupportedProject(project_type)) => {
                report.skipped(
                    source,
                    format!("unsupported project type '{project_type}'"),
                );
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        let validation = validate_document(&document);
        for warning in &validation.warnings {
            report.warn(format!("{}: {warning}", source.display()));
        }
        if !validation.is_ok() {
            return Err(ConvertError::InvalidDocument {
                errors: validation.errors,
            }
            .into());
        }

        let rendered = render(&document);
        let workflow_path = self.workflows_dir().join(format!("{name}.yml"));
        if !self.dry_run {
            fs::write(&workflow_path, &rendered).with_context(|| {
                format!("Failed to write workflow: {}", workflow_path.display())
            })?;
        }

        let jobs = document
            .get("jobs")
            .and_then(Value::as_mapping)
            .map(|jobs| jobs.keys().cloned().collect())
            .unwrap_or_default();
        report.converted(source, &workflow_path, &info, jobs, &rendered);
        Ok(())
    }
}

// Pipelines whose directories share a name would write the same document;
// later ones get a numeric suffix.
fn assign_names(root: &Path, pipelines: &[PathBuf], report: &mut ConversionReport) -> Vec<String> {
    let mut taken = HashSet::new();
    pipelines
        .iter()
        .map(|source| {
            let base = workflow_name(root, source);
            let mut name = base.clone();
            let mut suffix = 1;
            while !taken.insert(name.clone()) {
                suffix += 1;
                name = format!("{base}-{suffix}");
            }
            if suffix > 1 {
                report.warn(format!(
                    "Workflow name '{base}' already used, writing {} as '{name}'",
                    source.display()
                ));
            }
            name
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colliding_names_get_suffixes() {
        let root = Path::new("/repo");
        let pipelines = vec![
            root.join("a/svc/Jenkinsfile"),
            root.join("b/svc/Jenkinsfile"),
            root.join("Jenkinsfile"),
            root.join("c/svc/Jenkinsfile"),
        ];
        let mut report = ConversionReport::new(root, Path::new("/out"));
        let names = assign_names(root, &pipelines, &mut report);
        assert_eq!(names, ["ci-svc", "ci-svc-2", "ci", "ci-svc-3"]);
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn missing_input_is_fatal() {
        let converter = Converter::new(
            "/definitely/not/here",
            "/tmp/unused-output",
            ConvertOptions::default(),
        );
        let err = converter.convert().unwrap_err();
        assert!(matches!(err, ConvertError::InputMissing(_)));
    }
}
