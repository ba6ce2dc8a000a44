//! Jobs for Maven projects: matrix build, optional delivery, dependency scan.

use crate::document::{Mapping, Value};
use crate::jenkinsfile::{PipelineInfo, StageCategory};

const CHECKOUT_ACTION: &str = "actions/checkout@v4";
const SETUP_JAVA_ACTION: &str = "actions/setup-java@v4";
const CACHE_ACTION: &str = "actions/cache@v4";
const TEST_REPORTER_ACTION: &str = "dorny/test-reporter@v1";
const UPLOAD_ACTION: &str = "actions/upload-artifact@v4";
const DOWNLOAD_ACTION: &str = "actions/download-artifact@v4";

const JAVA_DISTRIBUTION: &str = "temurin";
const JAR_ARTIFACT: &str = "jar-artifact";
const SCAN_ARTIFACT: &str = "owasp-dependency-check-report";
const RETENTION_DAYS: u32 = 30;
const MATRIX_VERSION: &str = "${{ matrix.java-version }}";

pub const BUILD_JOB: &str = "build-and-test";
pub const DELIVER_JOB: &str = "deliver";
pub const SECURITY_JOB: &str = "security-scan";

/// Settings shared by every Maven job of one workflow.
#[derive(Debug, Clone, Copy)]
pub struct MavenJobs<'a> {
    pub runner: &'a str,
    pub versions: &'a [String],
    /// Last entry of `versions`.
    pub primary: &'a str,
}

impl MavenJobs<'_> {
    /// Build the `jobs` mapping for `info`.
    ///
    /// `deliver` is only present when the pipeline had a delivery stage;
    /// `security-scan` is always added.
    pub fn build(&self, info: &PipelineInfo) -> Mapping {
        let workdir = Workdir::new(info.working_directory.as_deref());

        let mut jobs = Mapping::new();
        jobs.insert(BUILD_JOB.into(), self.build_and_test(&workdir));
        if info.has_stage(StageCategory::Deliver) {
            jobs.insert(DELIVER_JOB.into(), self.deliver(&workdir));
        }
        jobs.insert(SECURITY_JOB.into(), self.security_scan(&workdir));
        jobs
    }

    fn build_and_test(&self, workdir: &Workdir) -> Value {
        let mut steps = vec![
            checkout(),
            setup_java(&format!("Set up JDK {MATRIX_VERSION}"), MATRIX_VERSION),
            Value::mapping()
                .with("name", "Cache Maven dependencies")
                .with("uses", CACHE_ACTION)
                .with(
                    "with",
                    Value::mapping()
                        .with("path", "~/.m2")
                        .with("key", "${{ runner.os }}-m2-${{ hashFiles('**/pom.xml') }}")
                        .with("restore-keys", "${{ runner.os }}-m2"),
                )
                .build(),
            run("Validate Maven project", "mvn validate"),
            run("Compile project", "mvn compile"),
            run("Run tests", "mvn test"),
            Value::mapping()
                .with("name", "Generate test report")
                .with("uses", TEST_REPORTER_ACTION)
                .with("if", "success() || failure()")
                .with(
                    "with",
                    Value::mapping()
                        .with("name", format!("Maven Tests (JDK {MATRIX_VERSION})"))
                        .with("path", workdir.path("target/surefire-reports/*.xml"))
                        .with("reporter", "java-junit")
                        .with("fail-on-error", true),
                )
                .build(),
            run("Build package", "mvn -B -DskipTests clean package"),
            Value::mapping()
                .with("name", "Upload build artifacts")
                .with("uses", UPLOAD_ACTION)
                .with("if", format!("matrix.java-version == '{}'", self.primary))
                .with(
                    "with",
                    Value::mapping()
                        .with("name", JAR_ARTIFACT)
                        .with("path", workdir.path("target/*.jar"))
                        .with("retention-days", RETENTION_DAYS),
                )
                .build(),
        ];
        workdir.apply(&mut steps);

        Value::mapping()
            .with("runs-on", self.runner)
            .with(
                "strategy",
                Value::mapping().with(
                    "matrix",
                    Value::mapping().with("java-version", self.versions.to_vec()),
                ),
            )
            .with("steps", steps)
            .build()
    }

    fn deliver(&self, workdir: &Workdir) -> Value {
        let mut steps = vec![
            checkout(),
            setup_java(&format!("Set up JDK {}", self.primary), self.primary),
            Value::mapping()
                .with("name", "Download build artifacts")
                .with("uses", DOWNLOAD_ACTION)
                .with(
                    "with",
                    Value::mapping()
                        .with("name", JAR_ARTIFACT)
                        .with("path", workdir.path("target/")),
                )
                .build(),
            run(
                "Install to local repository",
                Value::multiline([
                    "echo \"Installing Maven-built Java application to local Maven repository\"",
                    "mvn jar:jar install:install help:evaluate -Dexpression=project.name",
                ]),
            ),
            Value::mapping()
                .with("name", "Extract project information")
                .with("id", "project-info")
                .with(
                    "run",
                    Value::multiline([
                        "echo \"Extracting project name and version\"",
                        "NAME=$(mvn -q -DforceStdout help:evaluate -Dexpression=project.name)",
                        "VERSION=$(mvn -q -DforceStdout help:evaluate -Dexpression=project.version)",
                        "echo \"PROJECT_NAME=$NAME\" >> $GITHUB_OUTPUT",
                        "echo \"PROJECT_VERSION=$VERSION\" >> $GITHUB_OUTPUT",
                        "echo \"Project: $NAME\"",
                        "echo \"Version: $VERSION\"",
                    ]),
                )
                .build(),
            run(
                "Run application",
                Value::multiline([
                    "echo \"Running the Java application\"",
                    "java -jar target/${{ steps.project-info.outputs.PROJECT_NAME }}-${{ steps.project-info.outputs.PROJECT_VERSION }}.jar",
                ]),
            ),
        ];
        workdir.apply(&mut steps);

        Value::mapping()
            .with("needs", BUILD_JOB)
            .with("runs-on", self.runner)
            .with("if", "github.ref == 'refs/heads/main'")
            .with("steps", steps)
            .build()
    }

    fn security_scan(&self, workdir: &Workdir) -> Value {
        let mut steps = vec![
            checkout(),
            setup_java(&format!("Set up JDK {}", self.primary), self.primary),
            Value::mapping()
                .with("name", "Run OWASP Dependency Check")
                .with("run", "mvn org.owasp:dependency-check-maven:check")
                .with("continue-on-error", true)
                .build(),
            Value::mapping()
                .with("name", "Upload OWASP Dependency Check results")
                .with("uses", UPLOAD_ACTION)
                .with("if", "always()")
                .with(
                    "with",
                    Value::mapping()
                        .with("name", SCAN_ARTIFACT)
                        .with("path", workdir.path("target/dependency-check-report.html"))
                        .with("retention-days", RETENTION_DAYS),
                )
                .build(),
        ];
        workdir.apply(&mut steps);

        Value::mapping()
            .with("runs-on", self.runner)
            .with("needs", BUILD_JOB)
            .with("steps", steps)
            .build()
    }
}

/// Project directory as seen from the repository checkout.
struct Workdir(Option<String>);

impl Workdir {
    fn new(relative: Option<&str>) -> Self {
        Self(relative.map(|dir| format!("./{dir}")))
    }

    fn path(&self, relative: &str) -> String {
        match &self.0 {
            Some(dir) => format!("{dir}/{relative}"),
            None => relative.to_string(),
        }
    }

    // Pins every step that invokes Maven or the packaged jar to the project
    // directory. Steps are left untouched for root-level projects.
    fn apply(&self, steps: &mut [Value]) {
        let Some(dir) = &self.0 else {
            return;
        };
        for step in steps.iter_mut().filter_map(Value::as_mapping_mut) {
            let invokes_build = step
                .get("run")
                .and_then(Value::as_str)
                .is_some_and(invokes_build_tool);
            if invokes_build {
                step.insert("working-directory".into(), Value::from(dir));
            }
        }
    }
}

fn invokes_build_tool(command: &str) -> bool {
    command.contains("mvn") || command.contains("java -jar")
}

fn checkout() -> Value {
    Value::mapping()
        .with("name", "Checkout code")
        .with("uses", CHECKOUT_ACTION)
        .build()
}

fn setup_java(name: &str, version: &str) -> Value {
    Value::mapping()
        .with("name", name)
        .with("uses", SETUP_JAVA_ACTION)
        .with(
            "with",
            Value::mapping()
                .with("java-version", version)
                .with("distribution", JAVA_DISTRIBUTION)
                .with("cache", "maven"),
        )
        .build()
}

fn run(name: &str, command: impl Into<Value>) -> Value {
    Value::mapping()
        .with("name", name)
        .with("run", command)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jenkinsfile::Stage;
    use crate::project::ProjectType;

    fn info(stages: &[(&str, StageCategory)], working_directory: Option<&str>) -> PipelineInfo {
        PipelineInfo {
            stages: stages
                .iter()
                .map(|(name, category)| Stage {
                    name: name.to_string(),
                    category: *category,
                    commands: Vec::new(),
                })
                .collect(),
            project_type: ProjectType::Maven,
            working_directory: working_directory.map(str::to_string),
        }
    }

    fn jobs(info: &PipelineInfo) -> Mapping {
        let versions = vec!["17".to_string(), "21".to_string()];
        MavenJobs {
            runner: "ubuntu-latest",
            versions: &versions,
            primary: "21",
        }
        .build(info)
    }

    fn steps<'a>(jobs: &'a Mapping, job: &str) -> &'a [Value] {
        jobs[job].get("steps").and_then(Value::as_sequence).unwrap()
    }

    fn step<'a>(jobs: &'a Mapping, job: &str, name: &str) -> &'a Value {
        steps(jobs, job)
            .iter()
            .find(|step| step.get("name").and_then(Value::as_str) == Some(name))
            .unwrap_or_else(|| panic!("step '{name}' missing from {job}"))
    }

    #[test]
    fn build_job_runs_fixed_step_sequence() {
        let jobs = jobs(&info(&[("Build", StageCategory::Build)], None));
        let names: Vec<_> = steps(&jobs, BUILD_JOB)
            .iter()
            .filter_map(|s| s.get("name").and_then(Value::as_str))
            .collect();
        assert_eq!(
            names,
            [
                "Checkout code",
                "Set up JDK ${{ matrix.java-version }}",
                "Cache Maven dependencies",
                "Validate Maven project",
                "Compile project",
                "Run tests",
                "Generate test report",
                "Build package",
                "Upload build artifacts",
            ]
        );
    }

    #[test]
    fn upload_runs_only_for_last_matrix_version() {
        let jobs = jobs(&info(&[], None));
        let upload = step(&jobs, BUILD_JOB, "Upload build artifacts");
        assert_eq!(
            upload.get("if").and_then(Value::as_str),
            Some("matrix.java-version == '21'")
        );
        let report = step(&jobs, BUILD_JOB, "Generate test report");
        assert_eq!(
            report.get("if").and_then(Value::as_str),
            Some("success() || failure()")
        );
    }

    #[test]
    fn matrix_lists_versions_in_order() {
        let jobs = jobs(&info(&[], None));
        let matrix = jobs[BUILD_JOB]
            .get("strategy")
            .and_then(|s| s.get("matrix"))
            .and_then(|m| m.get("java-version"))
            .and_then(Value::as_sequence)
            .unwrap();
        assert_eq!(matrix, [Value::from("17"), Value::from("21")]);
    }

    #[test]
    fn deliver_job_requires_delivery_stage() {
        let without = jobs(&info(&[("Build", StageCategory::Build)], None));
        assert!(!without.contains_key(DELIVER_JOB));
        assert!(without.contains_key(SECURITY_JOB));

        let with = jobs(&info(&[("Deliver", StageCategory::Deliver)], None));
        let deliver = &with[DELIVER_JOB];
        assert_eq!(
            deliver.get("if").and_then(Value::as_str),
            Some("github.ref == 'refs/heads/main'")
        );
        assert_eq!(deliver.get("needs").and_then(Value::as_str), Some(BUILD_JOB));
        let keys: Vec<_> = with.keys().map(String::as_str).collect();
        assert_eq!(keys, [BUILD_JOB, DELIVER_JOB, SECURITY_JOB]);
    }

    #[test]
    fn deliver_pins_primary_version_and_reads_outputs() {
        let jobs = jobs(&info(&[("Deploy", StageCategory::Deliver)], None));
        let setup = step(&jobs, DELIVER_JOB, "Set up JDK 21");
        assert_eq!(
            setup
                .get("with")
                .and_then(|w| w.get("java-version"))
                .and_then(Value::as_str),
            Some("21")
        );
        let run_app = step(&jobs, DELIVER_JOB, "Run application");
        let command = run_app.get("run").unwrap();
        assert!(matches!(command, Value::Multiline(_)));
        assert!(
            command
                .as_str()
                .unwrap()
                .contains("${{ steps.project-info.outputs.PROJECT_VERSION }}")
        );
        let info_step = step(&jobs, DELIVER_JOB, "Extract project information");
        assert_eq!(info_step.get("id").and_then(Value::as_str), Some("project-info"));
    }

    #[test]
    fn security_scan_continues_on_error_and_always_uploads() {
        let jobs = jobs(&info(&[], None));
        let check = step(&jobs, SECURITY_JOB, "Run OWASP Dependency Check");
        assert_eq!(
            check.get("continue-on-error").and_then(Value::as_bool),
            Some(true)
        );
        let upload = step(&jobs, SECURITY_JOB, "Upload OWASP Dependency Check results");
        assert_eq!(upload.get("if").and_then(Value::as_str), Some("always()"));
        assert_eq!(
            upload
                .get("with")
                .and_then(|w| w.get("retention-days"))
                .and_then(Value::as_str),
            Some("30")
        );
    }

    #[test]
    fn working_directory_is_applied_to_build_tool_steps() {
        let jobs = jobs(&info(&[("Deliver", StageCategory::Deliver)], Some("proj/sub")));

        for job in [BUILD_JOB, DELIVER_JOB, SECURITY_JOB] {
            for step in steps(&jobs, job) {
                let command = step.get("run").and_then(Value::as_str);
                let workdir = step.get("working-directory").and_then(Value::as_str);
                match command {
                    Some(_) => assert_eq!(workdir, Some("./proj/sub"), "{job}: {step:?}"),
                    None => assert_eq!(workdir, None),
                }
            }
        }

        let upload = step(&jobs, BUILD_JOB, "Upload build artifacts");
        assert_eq!(
            upload
                .get("with")
                .and_then(|w| w.get("path"))
                .and_then(Value::as_str),
            Some("./proj/sub/target/*.jar")
        );
        let download = step(&jobs, DELIVER_JOB, "Download build artifacts");
        assert_eq!(
            download
                .get("with")
                .and_then(|w| w.get("path"))
                .and_then(Value::as_str),
            Some("./proj/sub/target/")
        );
    }

    #[test]
    fn root_projects_have_no_working_directory() {
        let jobs = jobs(&info(&[("Deliver", StageCategory::Deliver)], None));
        for job in [BUILD_JOB, DELIVER_JOB, SECURITY_JOB] {
            assert!(
                steps(&jobs, job)
                    .iter()
                    .all(|step| step.get("working-directory").is_none())
            );
        }
    }
}
